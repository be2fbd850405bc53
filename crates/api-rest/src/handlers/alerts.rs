use super::{created, ok, ok_with, Created, Reply};
use crate::{extract::{ApiJson, ApiQuery}, AppState};
use api_shared::{AcknowledgeReq, AlertQuery};
use axum::extract::State;
use icu_core::models::{Alert, NewAlert};

#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertQuery),
    responses((status = 200, description = "Alerts, newest first", body = [Alert]))
)]
#[axum::debug_handler]
pub async fn list_alerts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AlertQuery>,
) -> Reply<Vec<Alert>> {
    ok(state.services.alerts.list(query.acknowledged)?)
}

#[utoipa::path(
    post,
    path = "/api/alerts",
    request_body = NewAlert,
    responses(
        (status = 201, description = "Alert raised with an ALT identifier", body = Alert),
        (status = 400, description = "Invalid data")
    )
)]
#[axum::debug_handler]
pub async fn raise_alert(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewAlert>,
) -> Created<Alert> {
    created("Alert raised", state.services.alerts.raise(req)?)
}

#[utoipa::path(
    post,
    path = "/api/alerts/acknowledge",
    request_body = AcknowledgeReq,
    responses(
        (status = 200, description = "Every listed alert acknowledged", body = [Alert]),
        (status = 400, description = "Unknown alert or user; nothing was changed")
    )
)]
/// Acknowledge a batch of alerts. Already acknowledged alerts are stamped again.
#[axum::debug_handler]
pub async fn acknowledge_alerts(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AcknowledgeReq>,
) -> Reply<Vec<Alert>> {
    let alerts = state
        .services
        .alerts
        .acknowledge(&req.alert_ids, req.acknowledged_by)?;
    ok_with(format!("{} alert(s) acknowledged", alerts.len()), alerts)
}
