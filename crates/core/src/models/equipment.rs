//! Medical equipment tracking.

use super::RowId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    #[default]
    Available,
    InUse,
    Maintenance,
    OutOfService,
}

impl EquipmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EquipmentStatus::Available => "Available",
            EquipmentStatus::InUse => "In Use",
            EquipmentStatus::Maintenance => "Under Maintenance",
            EquipmentStatus::OutOfService => "Out of Service",
        }
    }
}

/// A tracked piece of equipment. `equipment_id` is supplied by the caller (asset tag).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: RowId,
    pub equipment_id: String,
    pub name: String,
    pub equipment_type: String,
    pub status: EquipmentStatus,
    /// Current location or room.
    pub location: String,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    pub assigned_to_patient: Option<RowId>,
    pub notes: String,
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.equipment_id)
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewEquipment {
    pub equipment_id: String,
    pub name: String,
    pub equipment_type: String,
    #[serde(default)]
    pub status: Option<EquipmentStatus>,
    pub location: String,
    #[serde(default)]
    pub last_maintenance_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_maintenance_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to_patient: Option<RowId>,
    #[serde(default)]
    pub notes: String,
}

/// Partial update. The asset tag is fixed once registered.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct EquipmentUpdate {
    pub name: Option<String>,
    pub equipment_type: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub last_maintenance_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub next_maintenance_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<i64>)]
    pub assigned_to_patient: Option<Option<RowId>>,
    pub notes: Option<String>,
}
