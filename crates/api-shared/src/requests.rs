//! Request shapes that are not entity payloads.

use icu_core::models::RowId;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Bulk alert acknowledgment.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct AcknowledgeReq {
    pub alert_ids: Vec<RowId>,
    pub acknowledged_by: RowId,
}

/// Query string of the alert listing.
#[derive(Clone, Copy, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AlertQuery {
    /// Only alerts in this acknowledgment state.
    pub acknowledged: Option<bool>,
}
