use super::{created, ok, Created, Reply};
use crate::{extract::{ApiJson, ApiPath}, AppState};
use axum::extract::State;
use icu_core::models::{Equipment, EquipmentUpdate, NewEquipment, RowId};

#[utoipa::path(
    get,
    path = "/api/equipment",
    responses((status = 200, description = "Equipment ordered by name", body = [Equipment]))
)]
#[axum::debug_handler]
pub async fn list_equipment(State(state): State<AppState>) -> Reply<Vec<Equipment>> {
    ok(state.services.equipment.list()?)
}

#[utoipa::path(
    post,
    path = "/api/equipment",
    request_body = NewEquipment,
    responses(
        (status = 201, description = "Equipment registered", body = Equipment),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "Equipment id already registered")
    )
)]
#[axum::debug_handler]
pub async fn register_equipment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewEquipment>,
) -> Created<Equipment> {
    created("Equipment registered", state.services.equipment.register(req)?)
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    params(("id" = i64, Path, description = "Equipment store key")),
    responses(
        (status = 200, description = "The equipment", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
#[axum::debug_handler]
pub async fn get_equipment(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> Reply<Equipment> {
    ok(state.services.equipment.get(id)?)
}

#[utoipa::path(
    put,
    path = "/api/equipment/{id}",
    params(("id" = i64, Path, description = "Equipment store key")),
    request_body = EquipmentUpdate,
    responses(
        (status = 200, description = "Updated equipment", body = Equipment),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Equipment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_equipment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<EquipmentUpdate>,
) -> Reply<Equipment> {
    ok(state.services.equipment.update(id, update)?)
}
