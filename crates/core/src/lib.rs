//! # ICU Core
//!
//! Core business logic for the ICU management backend.
//!
//! This crate owns every persisted entity and the rules that span them:
//! - identifier assignment on first save (`PAT`, `RX`, `TRT`, `ADM`, `HIST`, `ALT`)
//! - role-gated references between records and staff
//! - cascade and nullify rules on deletion
//! - the login check against stored argon2 hashes
//!
//! **No API concerns**: HTTP servers, response envelopes and console commands belong in
//! `api-rest`, `api-shared` and `icu-cli`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod repositories;
pub mod store;
pub mod validation;

pub use auth::AuthService;
pub use config::{CoreConfig, StorageLocation};
pub use error::{AuthFailure, ErrorKind, FieldErrors, IcuError, IcuResult};
pub use icu_ids::{IdPrefix, RecordId};
pub use icu_types::NonEmptyText;
pub use repositories::{
    AlertService, ClinicalService, EquipmentService, PatientService, ScheduleService,
    StaffService,
};
pub use store::Store;

use std::sync::Arc;

/// Every service, sharing one store and configuration.
#[derive(Clone)]
pub struct Services {
    pub store: Store,
    pub auth: AuthService,
    pub staff: StaffService,
    pub patients: PatientService,
    pub clinical: ClinicalService,
    pub equipment: EquipmentService,
    pub alerts: AlertService,
    pub schedules: ScheduleService,
}

impl Services {
    pub fn new(store: Store, cfg: Arc<CoreConfig>) -> Self {
        Self {
            auth: AuthService::new(store.clone()),
            staff: StaffService::new(store.clone(), cfg),
            patients: PatientService::new(store.clone()),
            clinical: ClinicalService::new(store.clone()),
            equipment: EquipmentService::new(store.clone()),
            alerts: AlertService::new(store.clone()),
            schedules: ScheduleService::new(store.clone()),
            store,
        }
    }

    /// Open the store described by `cfg` and build the services on top of it.
    pub fn open(cfg: Arc<CoreConfig>) -> IcuResult<Self> {
        let store = Store::open(&cfg)?;
        Ok(Self::new(store, cfg))
    }
}
