//! # Doctor Catalog
//!
//! The doctors a patient can book, with the time slots each one offers.
//! The list is fixed at compile time, like the booking screen it backs.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// Medical specialties shown on the service screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Neurologist,
    Cardiologist,
    Pediatrician,
    Oncologist,
    Dermatologist,
    Radiologist,
    FamilyDoctor,
}

impl Specialty {
    /// All specialties, in display order.
    pub const ALL: [Specialty; 7] = [
        Specialty::Neurologist,
        Specialty::Cardiologist,
        Specialty::Pediatrician,
        Specialty::Oncologist,
        Specialty::Dermatologist,
        Specialty::Radiologist,
        Specialty::FamilyDoctor,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Specialty::Neurologist => "Neurologist",
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Pediatrician => "Pediatrician",
            Specialty::Oncologist => "Oncologist",
            Specialty::Dermatologist => "Dermatologist",
            Specialty::Radiologist => "Radiologist",
            Specialty::FamilyDoctor => "Family Doctor",
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        Specialty::ALL
            .into_iter()
            .find(|sp| sp.label().to_lowercase().replace(' ', "") == wanted)
            .or(match wanted.as_str() {
                "familydoc" => Some(Specialty::FamilyDoctor),
                _ => None,
            })
            .ok_or_else(|| format!("unknown specialty: {}", s))
    }
}

/// A bookable doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub name: &'static str,
    pub specialty: Specialty,
    pub available_times: &'static [&'static str],
}

impl Doctor {
    /// Returns true if the doctor offers the given slot.
    pub fn offers(&self, time: &str) -> bool {
        self.available_times.iter().any(|t| *t == time.trim())
    }
}

static DOCTORS: &[Doctor] = &[
    Doctor {
        name: "Dr. Jane Smith",
        specialty: Specialty::Neurologist,
        available_times: &["09:00 AM", "11:00 AM"],
    },
    Doctor {
        name: "Dr. Michael Lee",
        specialty: Specialty::Cardiologist,
        available_times: &["10:30 AM", "01:00 PM"],
    },
    Doctor {
        name: "Dr. Aisha Patel",
        specialty: Specialty::Dermatologist,
        available_times: &["08:00 AM", "12:00 PM"],
    },
];

/// Returns every bookable doctor.
pub fn doctors() -> &'static [Doctor] {
    DOCTORS
}

/// Finds a doctor by exact (trimmed, case-insensitive) name.
pub fn find_doctor(name: &str) -> Option<&'static Doctor> {
    let name = name.trim();
    DOCTORS.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Lists the doctors of one specialty.
pub fn doctors_by_specialty(specialty: Specialty) -> impl Iterator<Item = &'static Doctor> {
    DOCTORS.iter().filter(move |d| d.specialty == specialty)
}

/// Resolves a booking request against the catalog.
///
/// ## Returns
/// * `Ok(&Doctor)` - the doctor exists and offers `time`
/// * `Err(CoreError::UnknownDoctor)` - no such doctor
/// * `Err(CoreError::SlotUnavailable)` - the doctor does not offer `time`
pub fn resolve_booking(doctor_name: &str, time: &str) -> CoreResult<&'static Doctor> {
    let doctor =
        find_doctor(doctor_name).ok_or_else(|| CoreError::UnknownDoctor(doctor_name.to_string()))?;

    if !doctor.offers(time) {
        return Err(CoreError::SlotUnavailable {
            doctor: doctor.name.to_string(),
            time: time.to_string(),
        });
    }

    Ok(doctor)
}
