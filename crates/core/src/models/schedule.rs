//! Staff shift schedules.

use super::{RowId, Shift};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One shift assignment. At most one row exists per (staff, date, shift).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    pub id: RowId,
    pub staff: RowId,
    pub shift: Shift,
    pub date: NaiveDate,
    pub department: String,
    pub notes: String,
}

impl Schedule {
    /// The uniqueness key of this row.
    pub fn slot(&self) -> (RowId, NaiveDate, Shift) {
        (self.staff, self.date, self.shift)
    }
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewSchedule {
    pub staff: RowId,
    pub shift: Shift,
    pub date: NaiveDate,
    pub department: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ScheduleUpdate {
    pub staff: Option<RowId>,
    pub shift: Option<Shift>,
    pub date: Option<NaiveDate>,
    pub department: Option<String>,
    pub notes: Option<String>,
}
