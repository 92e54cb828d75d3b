//! # Doctor Commands
//!
//! Lists the doctor catalog, optionally by specialty.

use serde::Serialize;

use crate::output::{Listed, Render};
use mediroom_core::catalog::{self, Doctor};
use mediroom_core::Specialty;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDto {
    pub name: String,
    pub specialty: String,
    pub available_times: Vec<String>,
}

impl From<&Doctor> for DoctorDto {
    fn from(d: &Doctor) -> Self {
        DoctorDto {
            name: d.name.to_string(),
            specialty: d.specialty.label().to_string(),
            available_times: d.available_times.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Render for DoctorDto {
    fn render(&self) -> String {
        format!(
            "{} ({}): {}",
            self.name,
            self.specialty,
            self.available_times.join(", ")
        )
    }
}

impl Listed for DoctorDto {
    const EMPTY: &'static str = "No doctors available.";
}

/// Lists doctors, all of them or one specialty's.
pub fn list_doctors(specialty: Option<Specialty>) -> Vec<DoctorDto> {
    match specialty {
        Some(s) => catalog::doctors_by_specialty(s).map(DoctorDto::from).collect(),
        None => catalog::doctors().iter().map(DoctorDto::from).collect(),
    }
}
