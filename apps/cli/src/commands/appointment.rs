//! # Appointment Commands
//!
//! Booking a catalog slot and listing booked appointments.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  book --doctor "dr. jane smith" --time "09:00 AM"                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve_booking: known doctor? offers the slot? ──► NOT_FOUND          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Appointment { doctor_name: "Dr. Jane Smith", .. }  (catalog spelling)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  appointments().save_and_wait ──► new id                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::output::{Listed, Render};
use mediroom_core::catalog;
use mediroom_core::validation::validate_appointment;
use mediroom_core::{Appointment, CoreError, RowId};
use mediroom_store::Stores;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: Option<RowId>,
    pub doctor_name: String,
    pub time: String,
    pub notes: String,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        AppointmentDto {
            id: a.id,
            doctor_name: a.doctor_name,
            time: a.time,
            notes: a.notes,
        }
    }
}

impl Render for AppointmentDto {
    fn render(&self) -> String {
        let mut line = format!("{} at {}", self.doctor_name, self.time);
        if !self.notes.is_empty() {
            line.push_str(&format!(" ({})", self.notes));
        }
        line
    }
}

impl Listed for AppointmentDto {
    const EMPTY: &'static str = "No appointments booked.";
}

/// Books `time` with `doctor`.
///
/// ## Arguments
/// * `doctor` - Doctor name, matched case-insensitively against the catalog
/// * `time` - One of the doctor's offered slots
/// * `notes` - Optional free text
///
/// ## Returns
/// The stored appointment with its new id.
pub async fn book_appointment(
    stores: &Stores,
    doctor: &str,
    time: &str,
    notes: Option<String>,
) -> Result<AppointmentDto, ApiError> {
    let resolved = catalog::resolve_booking(doctor, time)?;

    let mut appointment = Appointment::new(resolved.name, time.trim(), notes.unwrap_or_default());
    validate_appointment(&appointment)?;

    let outcome = stores
        .appointments()
        .save_and_wait(appointment.clone())
        .await?;
    appointment.id = outcome.id();

    info!(
        doctor = %appointment.doctor_name,
        time = %appointment.time,
        id = ?appointment.id,
        "Appointment booked"
    );

    Ok(appointment.into())
}

/// Lists appointments, newest first, optionally for one doctor.
///
/// The full list comes from the live store's first read. A doctor filter
/// queries the table directly, since the store only holds the full list.
pub async fn list_appointments(
    stores: &Stores,
    doctor: Option<&str>,
) -> Result<Vec<AppointmentDto>, ApiError> {
    let appointments = match doctor {
        Some(name) => {
            let resolved = catalog::find_doctor(name)
                .ok_or_else(|| CoreError::UnknownDoctor(name.to_string()))?;
            stores
                .database()
                .appointments()
                .list_for_doctor(resolved.name)
                .await?
        }
        None => stores.appointments().loaded().await?,
    };

    Ok(appointments.into_iter().map(AppointmentDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{fresh_view, memory_stores};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_book_and_list() {
        let stores = memory_stores().await;

        let first = book_appointment(&stores, "Dr. Jane Smith", "09:00 AM", None)
            .await
            .unwrap();
        let second = book_appointment(
            &stores,
            "dr. michael lee",
            "10:30 AM",
            Some("follow-up".into()),
        )
        .await
        .unwrap();

        assert!(second.id > first.id);
        assert_eq!(second.doctor_name, "Dr. Michael Lee");

        let listed = list_appointments(&fresh_view(&stores), None)
            .await
            .unwrap();
        let names: Vec<_> = listed.iter().map(|a| a.doctor_name.as_str()).collect();
        assert_eq!(names, ["Dr. Michael Lee", "Dr. Jane Smith"]);
        assert_eq!(listed[0].render(), "Dr. Michael Lee at 10:30 AM (follow-up)");
        assert_eq!(listed[1].render(), "Dr. Jane Smith at 09:00 AM");

        stores.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_for_one_doctor() {
        let stores = memory_stores().await;
        book_appointment(&stores, "Dr. Jane Smith", "09:00 AM", None)
            .await
            .unwrap();
        book_appointment(&stores, "Dr. Michael Lee", "01:00 PM", None)
            .await
            .unwrap();

        let listed = list_appointments(&stores, Some("DR. JANE SMITH"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].time, "09:00 AM");

        stores.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_doctor_or_slot_rejected() {
        let stores = memory_stores().await;

        let err = book_appointment(&stores, "Dr. Nobody", "09:00 AM", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = book_appointment(&stores, "Dr. Jane Smith", "03:00 AM", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        assert!(list_appointments(&stores, None).await.unwrap().is_empty());
        stores.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_list_notice() {
        let stores = memory_stores().await;
        let listed = list_appointments(&stores, None).await.unwrap();
        assert_eq!(listed.render(), "No appointments booked.");
        stores.shutdown().await;
    }
}
