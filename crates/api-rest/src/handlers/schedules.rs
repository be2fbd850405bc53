use super::{created, ok, Created, Reply};
use crate::{error::ApiError, extract::{ApiJson, ApiPath}, AppState};
use api_shared::ApiResponse;
use axum::{
    extract::State,
    Json,
};
use icu_core::models::{NewSchedule, RowId, Schedule, ScheduleUpdate};

#[utoipa::path(
    get,
    path = "/api/schedules",
    responses((status = 200, description = "Schedules, latest date first then by shift", body = [Schedule]))
)]
#[axum::debug_handler]
pub async fn list_schedules(State(state): State<AppState>) -> Reply<Vec<Schedule>> {
    ok(state.services.schedules.list()?)
}

#[utoipa::path(
    post,
    path = "/api/schedules",
    request_body = NewSchedule,
    responses(
        (status = 201, description = "Shift scheduled", body = Schedule),
        (status = 400, description = "Invalid data, including staff who are not doctors or nurses"),
        (status = 409, description = "The staff member already has this shift on this date")
    )
)]
#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewSchedule>,
) -> Created<Schedule> {
    created("Schedule created", state.services.schedules.create(req)?)
}

#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    params(("id" = i64, Path, description = "Schedule store key")),
    request_body = ScheduleUpdate,
    responses(
        (status = 200, description = "Updated schedule", body = Schedule),
        (status = 404, description = "Schedule not found"),
        (status = 409, description = "The new slot is already taken")
    )
)]
#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<ScheduleUpdate>,
) -> Reply<Schedule> {
    ok(state.services.schedules.update(id, update)?)
}

#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    params(("id" = i64, Path, description = "Schedule store key")),
    responses(
        (status = 200, description = "Schedule deleted"),
        (status = 404, description = "Schedule not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.services.schedules.delete(id)?;
    Ok(Json(ApiResponse::message("Schedule deleted")))
}
