//! ICU patient records.

use super::RowId;
use chrono::{DateTime, NaiveDate, Utc};
use icu_ids::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Clinical status of a patient.
///
/// Any status may be replaced by any other; no transition graph is imposed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientStatus {
    Critical,
    #[default]
    Stable,
    Recovering,
    Discharged,
    Transferred,
}

impl PatientStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PatientStatus::Critical => "Critical",
            PatientStatus::Stable => "Stable",
            PatientStatus::Recovering => "Recovering",
            PatientStatus::Discharged => "Discharged",
            PatientStatus::Transferred => "Transferred",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

/// A stored patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    pub id: RowId,
    #[schema(value_type = String, example = "PAT20260111143522045")]
    pub patient_id: RecordId,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub date_of_birth: Option<NaiveDate>,

    pub contact_number: String,
    pub emergency_contact: String,
    pub emergency_contact_name: String,

    pub diagnosis: String,
    pub medical_history: String,
    pub status: PatientStatus,

    pub room_number: String,
    pub bed_number: String,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,

    pub insurance_id: String,
    pub insurance_verified: bool,

    pub attending_physician: Option<RowId>,
    pub admitted_by: Option<RowId>,

    pub additional_notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Room {} ({})",
            self.name,
            self.room_number,
            self.status.label()
        )
    }
}

/// Payload for registering a patient. Only `name`, `age` and `gender` are required.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub status: Option<PatientStatus>,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub bed_number: String,
    #[serde(default)]
    pub discharge_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub insurance_id: String,
    #[serde(default)]
    pub insurance_verified: bool,
    #[serde(default)]
    pub attending_physician: Option<RowId>,
    #[serde(default)]
    pub admitted_by: Option<RowId>,
    #[serde(default)]
    pub additional_notes: String,
}

impl NewPatient {
    /// Minimal registration payload; everything else takes its default.
    pub fn new(name: impl Into<String>, age: u32, gender: Gender) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
            date_of_birth: None,
            contact_number: String::new(),
            emergency_contact: String::new(),
            emergency_contact_name: String::new(),
            diagnosis: String::new(),
            medical_history: String::new(),
            status: None,
            room_number: String::new(),
            bed_number: String::new(),
            discharge_date: None,
            insurance_id: String::new(),
            insurance_verified: false,
            attending_physician: None,
            admitted_by: None,
            additional_notes: String::new(),
        }
    }
}

/// Partial update of a patient. `patient_id` and `admission_date` are not updatable.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub contact_number: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub diagnosis: Option<String>,
    pub medical_history: Option<String>,
    pub status: Option<PatientStatus>,
    pub room_number: Option<String>,
    pub bed_number: Option<String>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub discharge_date: Option<Option<DateTime<Utc>>>,
    pub insurance_id: Option<String>,
    pub insurance_verified: Option<bool>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<i64>)]
    pub attending_physician: Option<Option<RowId>>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<i64>)]
    pub admitted_by: Option<Option<RowId>>,
    pub additional_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_patient_requires_only_name_age_and_gender() {
        let req: NewPatient =
            serde_json::from_str(r#"{"name": "Jane Doe", "age": 42, "gender": "F"}"#).unwrap();
        assert_eq!(req.gender, Gender::Female);
        assert_eq!(req.status, None);
        assert!(req.room_number.is_empty());

        let missing_age = serde_json::from_str::<NewPatient>(r#"{"name": "Jane", "gender": "F"}"#);
        assert!(missing_age.is_err());
    }

    #[test]
    fn status_defaults_to_stable() {
        assert_eq!(PatientStatus::default(), PatientStatus::Stable);
        assert_eq!(
            serde_json::to_string(&PatientStatus::Transferred).unwrap(),
            "\"TRANSFERRED\""
        );
    }
}
