//! Services over the store, one per area of the ICU record.
//!
//! Each service owns a [`Store`](crate::store::Store) handle and enforces the rules for its
//! entities: field validation, role-gated references, identifier assignment on first save and
//! uniqueness constraints.

pub mod alerts;
pub mod clinical;
pub mod equipment;
pub mod patients;
pub mod schedules;
pub mod shared;
pub mod staff;

pub use alerts::AlertService;
pub use clinical::ClinicalService;
pub use equipment::EquipmentService;
pub use patients::PatientService;
pub use schedules::ScheduleService;
pub use staff::StaffService;
