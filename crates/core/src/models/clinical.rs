//! Clinical records attached to a patient: vitals, prescriptions, treatment plans,
//! admissions and the treatment history audit trail.

use super::RowId;
use chrono::{DateTime, NaiveDate, Utc};
use icu_ids::RecordId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// VITALS
// ============================================================================

/// One vital-signs observation. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vitals {
    pub id: RowId,
    pub patient: RowId,
    /// Beats per minute.
    pub heart_rate: i32,
    pub blood_pressure_systolic: i32,
    pub blood_pressure_diastolic: i32,
    /// Degrees Celsius, one decimal place.
    pub temperature: f64,
    /// Percentage.
    pub oxygen_saturation: i32,
    pub respiratory_rate: Option<i32>,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<RowId>,
    pub notes: String,
}

impl Vitals {
    /// Blood pressure as `systolic/diastolic`.
    pub fn blood_pressure(&self) -> String {
        format!(
            "{}/{}",
            self.blood_pressure_systolic, self.blood_pressure_diastolic
        )
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewVitals {
    pub heart_rate: i32,
    pub blood_pressure_systolic: i32,
    pub blood_pressure_diastolic: i32,
    pub temperature: f64,
    pub oxygen_saturation: i32,
    #[serde(default)]
    pub respiratory_rate: Option<i32>,
    #[serde(default)]
    pub recorded_by: Option<RowId>,
    #[serde(default)]
    pub notes: String,
}

// ============================================================================
// PRESCRIPTIONS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    #[default]
    Active,
    Completed,
    Discontinued,
}

/// Route of administration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Route {
    #[default]
    Oral,
    Iv,
    Im,
    Sc,
    Topical,
    Inhalation,
}

impl Route {
    pub const fn label(self) -> &'static str {
        match self {
            Route::Oral => "Oral",
            Route::Iv => "Intravenous",
            Route::Im => "Intramuscular",
            Route::Sc => "Subcutaneous",
            Route::Topical => "Topical",
            Route::Inhalation => "Inhalation",
        }
    }
}

/// A medication prescription. Never deleted; retired by status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prescription {
    pub id: RowId,
    #[schema(value_type = String, example = "RX20260111143522045")]
    pub prescription_id: RecordId,
    pub patient: RowId,
    pub medicine_name: String,
    pub dosage: String,
    /// e.g. "Twice daily", "Every 6 hours".
    pub frequency: String,
    /// e.g. "7 days", "2 weeks".
    pub duration: String,
    pub route: Route,
    pub instructions: String,
    pub notes: String,
    pub status: PrescriptionStatus,
    pub prescribed_date: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub prescribed_by: Option<RowId>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewPrescription {
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default)]
    pub route: Option<Route>,
    pub instructions: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: Option<PrescriptionStatus>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub prescribed_by: Option<RowId>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct PrescriptionUpdate {
    pub medicine_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub route: Option<Route>,
    pub instructions: Option<String>,
    pub notes: Option<String>,
    pub status: Option<PrescriptionStatus>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<i64>)]
    pub prescribed_by: Option<Option<RowId>>,
}

// ============================================================================
// TREATMENT PLANS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Treatment {
    pub id: RowId,
    #[schema(value_type = String, example = "TRT20260111143522045")]
    pub treatment_id: RecordId,
    pub patient: RowId,
    pub treatment_type: String,
    pub description: String,
    pub priority: TreatmentPriority,
    pub duration: String,
    pub status: TreatmentStatus,
    pub notes: String,
    pub follow_up_required: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub prescribed_date: DateTime<Utc>,
    pub prescribed_by: Option<RowId>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewTreatment {
    pub treatment_type: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<TreatmentPriority>,
    pub duration: String,
    #[serde(default)]
    pub status: Option<TreatmentStatus>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub follow_up_required: bool,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default)]
    pub prescribed_by: Option<RowId>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct TreatmentUpdate {
    pub treatment_type: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TreatmentPriority>,
    pub duration: Option<String>,
    pub status: Option<TreatmentStatus>,
    pub notes: Option<String>,
    pub follow_up_required: Option<bool>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub follow_up_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<i64>)]
    pub prescribed_by: Option<Option<RowId>>,
}

// ============================================================================
// ADMISSIONS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionType {
    Emergency,
    Elective,
    Transfer,
}

/// Intake record for one admission event, including the intake vitals. Immutable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Admission {
    pub id: RowId,
    #[schema(value_type = String, example = "ADM20260111143522045")]
    pub admission_id: RecordId,
    pub patient: RowId,
    pub admission_type: AdmissionType,
    pub admission_datetime: DateTime<Utc>,
    pub room_number: String,
    /// Primary reason for admission.
    pub chief_complaint: String,
    pub initial_bp_systolic: i32,
    pub initial_bp_diastolic: i32,
    pub initial_heart_rate: i32,
    pub initial_temperature: f64,
    pub initial_oxygen: i32,
    pub emergency_contact_verified: bool,
    pub insurance_verified: bool,
    pub notes: String,
    pub admitted_by: Option<RowId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewAdmission {
    pub admission_type: AdmissionType,
    pub admission_datetime: DateTime<Utc>,
    pub room_number: String,
    pub chief_complaint: String,
    pub initial_bp_systolic: i32,
    pub initial_bp_diastolic: i32,
    pub initial_heart_rate: i32,
    pub initial_temperature: f64,
    pub initial_oxygen: i32,
    #[serde(default)]
    pub emergency_contact_verified: bool,
    #[serde(default)]
    pub insurance_verified: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub admitted_by: Option<RowId>,
}

// ============================================================================
// TREATMENT HISTORY
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Registration,
    Admission,
    Prescription,
    Treatment,
    Vitals,
    Procedure,
    Discharge,
    Other,
}

impl ActionType {
    pub const fn label(self) -> &'static str {
        match self {
            ActionType::Registration => "Patient Registration",
            ActionType::Admission => "Admission",
            ActionType::Prescription => "Prescription Added",
            ActionType::Treatment => "Treatment Plan Added",
            ActionType::Vitals => "Vitals Recorded",
            ActionType::Procedure => "Procedure Performed",
            ActionType::Discharge => "Discharge",
            ActionType::Other => "Other",
        }
    }
}

/// Append-only audit entry for a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreatmentHistory {
    pub id: RowId,
    #[schema(value_type = String, example = "HIST20260111143522045")]
    pub history_id: RecordId,
    pub patient: RowId,
    pub action_type: ActionType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub performed_by: Option<RowId>,
    pub related_prescription: Option<RowId>,
    pub related_treatment: Option<RowId>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewHistoryEntry {
    pub action_type: ActionType,
    pub description: String,
    #[serde(default)]
    pub performed_by: Option<RowId>,
    #[serde(default)]
    pub related_prescription: Option<RowId>,
    #[serde(default)]
    pub related_treatment: Option<RowId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_pressure_is_systolic_over_diastolic() {
        let vitals = Vitals {
            id: 1,
            patient: 1,
            heart_rate: 80,
            blood_pressure_systolic: 120,
            blood_pressure_diastolic: 80,
            temperature: 36.6,
            oxygen_saturation: 98,
            respiratory_rate: None,
            recorded_at: Utc::now(),
            recorded_by: None,
            notes: String::new(),
        };
        assert_eq!(vitals.blood_pressure(), "120/80");
    }

    #[test]
    fn route_codes_match_stored_values() {
        assert_eq!(serde_json::to_string(&Route::Iv).unwrap(), "\"IV\"");
        assert_eq!(
            serde_json::from_str::<Route>("\"INHALATION\"").unwrap(),
            Route::Inhalation
        );
    }

    #[test]
    fn prescription_update_can_clear_end_date() {
        let update: PrescriptionUpdate =
            serde_json::from_str(r#"{"status": "DISCONTINUED", "end_date": null}"#).unwrap();
        assert_eq!(update.status, Some(PrescriptionStatus::Discontinued));
        assert_eq!(update.end_date, Some(None));
        assert_eq!(update.prescribed_by, None);
    }
}
