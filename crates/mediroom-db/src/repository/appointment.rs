//! # Appointment Repository
//!
//! Booked appointments, newest first. Conflict policy: REPLACE.

use async_trait::async_trait;
use tracing::debug;

use super::live::{live_query, LiveQuery};
use super::{execute_insert, insert_sql, ConflictPolicy, InsertOutcome, TableAccessor};
use crate::changes::Table;
use crate::error::DbResult;
use crate::pool::Database;
use mediroom_core::Appointment;

const COLUMNS: &[&str] = &["id", "doctorName", "time", "notes"];

/// Repository for appointment database operations.
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    db: Database,
}

impl AppointmentRepository {
    /// Creates a new AppointmentRepository.
    pub fn new(db: Database) -> Self {
        AppointmentRepository { db }
    }

    /// Live list of every appointment, newest first.
    pub fn query_all(&self) -> LiveQuery<Vec<Appointment>> {
        self.watch()
    }

    /// All appointments booked with `doctor_name`, newest first.
    pub async fn list_for_doctor(&self, doctor_name: &str) -> DbResult<Vec<Appointment>> {
        self.db
            .bounded("list appointments", async {
                let rows = sqlx::query_as::<_, Appointment>(
                    r#"
                    SELECT id, doctorName, time, notes
                    FROM appointment
                    WHERE doctorName = ?1
                    ORDER BY id DESC
                    "#,
                )
                .bind(doctor_name)
                .fetch_all(self.db.pool())
                .await?;
                Ok(rows)
            })
            .await
    }
}

#[async_trait]
impl TableAccessor for AppointmentRepository {
    type Entity = Appointment;
    type Snapshot = Vec<Appointment>;

    const TABLE: Table = Table::Appointment;
    const POLICY: ConflictPolicy = ConflictPolicy::Replace;

    async fn insert(&self, appointment: &Appointment) -> DbResult<InsertOutcome> {
        debug!(
            id = ?appointment.id,
            doctor = %appointment.doctor_name,
            time = %appointment.time,
            "Inserting appointment"
        );

        let sql = insert_sql(Self::TABLE, Self::POLICY, COLUMNS);
        let Appointment {
            id,
            doctor_name,
            time,
            notes,
        } = appointment.clone();

        execute_insert(&self.db, Self::TABLE, sql, move |query| {
            query.bind(id).bind(doctor_name).bind(time).bind(notes)
        })
        .await
    }

    async fn fetch(&self) -> DbResult<Vec<Appointment>> {
        self.db
            .bounded("query appointments", async {
                let rows = sqlx::query_as::<_, Appointment>(
                    "SELECT id, doctorName, time, notes FROM appointment ORDER BY id DESC",
                )
                .fetch_all(self.db.pool())
                .await?;
                Ok(rows)
            })
            .await
    }

    fn watch(&self) -> LiveQuery<Vec<Appointment>> {
        let repo = self.clone();
        live_query(
            Self::TABLE,
            self.db.changes().subscribe(Self::TABLE),
            move || {
                let repo = repo.clone();
                async move { repo.fetch().await }
            },
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use futures::StreamExt;

    async fn repo() -> AppointmentRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().appointments()
    }

    #[tokio::test]
    async fn test_two_bookings_newest_first() {
        let repo = repo().await;

        repo.insert(&Appointment::new("Dr. Jane Smith", "09:00 AM", ""))
            .await
            .unwrap();
        repo.insert(&Appointment::new("Dr. Michael Lee", "10:30 AM", "follow-up"))
            .await
            .unwrap();

        let rows = repo.fetch().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].doctor_name, "Dr. Michael Lee");
        assert_eq!(rows[0].time, "10:30 AM");
        assert_eq!(rows[0].notes, "follow-up");
        assert_eq!(rows[1].doctor_name, "Dr. Jane Smith");
        assert_eq!(rows[1].notes, "");
        assert!(rows[0].id > rows[1].id);
    }

    #[tokio::test]
    async fn test_identities_are_assigned_and_monotonic() {
        let repo = repo().await;

        let first = repo
            .insert(&Appointment::new("Dr. Jane Smith", "09:00 AM", ""))
            .await
            .unwrap();
        let second = repo
            .insert(&Appointment::new("Dr. Jane Smith", "11:00 AM", ""))
            .await
            .unwrap();

        assert!(second.id().unwrap() > first.id().unwrap());
    }

    #[tokio::test]
    async fn test_replace_on_collision() {
        let repo = repo().await;

        let id = repo
            .insert(&Appointment::new("Dr. Jane Smith", "09:00 AM", ""))
            .await
            .unwrap()
            .id()
            .unwrap();
        let outcome = repo
            .insert(&Appointment::new("Dr. Aisha Patel", "08:00 AM", "rash").with_id(id))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Written(id));
        let rows = repo.fetch().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doctor_name, "Dr. Aisha Patel");
        assert_eq!(rows[0].id, Some(id));
    }

    #[tokio::test]
    async fn test_query_all_pushes_after_insert() {
        let repo = repo().await;
        let mut live = repo.query_all();

        assert!(live.next().await.unwrap().unwrap().is_empty());

        repo.insert(&Appointment::new("Dr. Michael Lee", "01:00 PM", ""))
            .await
            .unwrap();

        let snapshot = live.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].time, "01:00 PM");
    }

    #[tokio::test]
    async fn test_list_for_doctor() {
        let repo = repo().await;
        repo.insert(&Appointment::new("Dr. Jane Smith", "09:00 AM", ""))
            .await
            .unwrap();
        repo.insert(&Appointment::new("Dr. Michael Lee", "10:30 AM", ""))
            .await
            .unwrap();

        let rows = repo.list_for_doctor("Dr. Jane Smith").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time, "09:00 AM");
    }
}
