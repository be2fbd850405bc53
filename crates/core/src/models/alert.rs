//! System alerts and their acknowledgment state.

use super::RowId;
use chrono::{DateTime, Utc};
use icu_ids::RecordId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            AlertSeverity::Info => "Info",
            AlertSeverity::Warning => "Warning",
            AlertSeverity::Critical => "Critical",
        }
    }
}

/// An alert, optionally about one patient.
///
/// `acknowledged` only ever moves from `false` to `true`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    pub id: RowId,
    #[schema(value_type = String, example = "ALT20260111143522045")]
    pub alert_id: RecordId,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub patient: Option<RowId>,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<RowId>,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewAlert {
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub patient: Option<RowId>,
}
