//! Persisted entity definitions.
//!
//! Each entity comes in up to three shapes:
//! - the stored record (`Patient`, `Prescription`, ...), carrying its store key, generated
//!   identifier and timestamps;
//! - a creation payload (`NewPatient`, ...), what a caller supplies before first save;
//! - a partial update (`PatientUpdate`, ...), where every field is optional.
//!
//! Nullable references in partial updates use `Option<Option<_>>`: an absent key leaves the
//! field alone, an explicit `null` clears it.

pub mod alert;
pub mod clinical;
pub mod equipment;
pub mod patient;
pub mod schedule;
pub mod staff;

pub use alert::{Alert, AlertSeverity, NewAlert};
pub use clinical::{
    ActionType, Admission, AdmissionType, NewAdmission, NewHistoryEntry, NewPrescription,
    NewTreatment, NewVitals, Prescription, PrescriptionStatus, PrescriptionUpdate, Route,
    Treatment, TreatmentHistory, TreatmentPriority, TreatmentStatus, TreatmentUpdate, Vitals,
};
pub use equipment::{Equipment, EquipmentStatus, EquipmentUpdate, NewEquipment};
pub use patient::{Gender, NewPatient, Patient, PatientStatus, PatientUpdate};
pub use schedule::{NewSchedule, Schedule, ScheduleUpdate};
pub use staff::{
    DoctorDetail, NewDoctorDetail, NewNurseDetail, NewUser, NurseDetail, Role, Shift,
    Specialization, StaffView, User, UserUpdate,
};

/// Store key of a persisted record.
pub type RowId = i64;

/// Deserialises a present-but-possibly-null field into `Some(None)` / `Some(Some(v))`.
///
/// Pair with `#[serde(default)]` so that a missing key becomes `None`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
