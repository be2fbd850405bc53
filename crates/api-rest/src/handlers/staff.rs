//! Doctor and nurse views over the user table.
//!
//! Each route pair is a thin wrapper over the same view-parameterised helper; separate
//! functions exist so that each path gets its own OpenAPI entry.

use super::{blocking, created, ok, Created, Reply};
use crate::{extract::{ApiJson, ApiPath}, AppState};
use api_shared::UserRes;
use axum::extract::State;
use icu_core::models::{
    DoctorDetail, NewDoctorDetail, NewNurseDetail, NewUser, NurseDetail, RowId, StaffView,
    UserUpdate,
};

async fn list_view(state: &AppState, view: StaffView) -> Reply<Vec<UserRes>> {
    let users = state.services.staff.list_view(view)?;
    ok(users.into_iter().map(UserRes::from).collect())
}

async fn create_in_view(state: &AppState, view: StaffView, req: NewUser) -> Created<UserRes> {
    let staff = state.services.staff.clone();
    let user = blocking(move || staff.create_in_view(view, req)).await??;
    tracing::info!("Created {} {}", view.role().as_str(), user.username);
    let message = match view {
        StaffView::Doctors => "Doctor created",
        StaffView::Nurses => "Nurse created",
    };
    created(message, UserRes::from(user))
}

async fn update_in_view(
    state: &AppState,
    view: StaffView,
    id: RowId,
    update: UserUpdate,
) -> Reply<UserRes> {
    let staff = state.services.staff.clone();
    let user = blocking(move || staff.update_in_view(view, id, update)).await??;
    ok(UserRes::from(user))
}

#[utoipa::path(
    get,
    path = "/api/doctors",
    responses((status = 200, description = "Users with role DOCTOR", body = [UserRes]))
)]
#[axum::debug_handler]
pub async fn list_doctors(State(state): State<AppState>) -> Reply<Vec<UserRes>> {
    list_view(&state, StaffView::Doctors).await
}

#[utoipa::path(
    post,
    path = "/api/doctors",
    request_body = NewUser,
    responses(
        (status = 201, description = "Doctor created; role is forced to DOCTOR", body = UserRes),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "Username or employee id already taken")
    )
)]
#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewUser>,
) -> Created<UserRes> {
    create_in_view(&state, StaffView::Doctors, req).await
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    params(("id" = i64, Path, description = "User store key")),
    responses(
        (status = 200, description = "The doctor", body = UserRes),
        (status = 404, description = "No doctor with this key")
    )
)]
#[axum::debug_handler]
pub async fn get_doctor(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> Reply<UserRes> {
    ok(state.services.staff.get_in_view(StaffView::Doctors, id)?.into())
}

#[utoipa::path(
    put,
    path = "/api/doctors/{id}",
    params(("id" = i64, Path, description = "User store key")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated doctor; role changes are ignored", body = UserRes),
        (status = 404, description = "No doctor with this key")
    )
)]
#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Reply<UserRes> {
    update_in_view(&state, StaffView::Doctors, id, update).await
}

#[utoipa::path(
    get,
    path = "/api/nurses",
    responses((status = 200, description = "Users with role NURSE", body = [UserRes]))
)]
#[axum::debug_handler]
pub async fn list_nurses(State(state): State<AppState>) -> Reply<Vec<UserRes>> {
    list_view(&state, StaffView::Nurses).await
}

#[utoipa::path(
    post,
    path = "/api/nurses",
    request_body = NewUser,
    responses(
        (status = 201, description = "Nurse created; role is forced to NURSE", body = UserRes),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "Username or employee id already taken")
    )
)]
#[axum::debug_handler]
pub async fn create_nurse(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewUser>,
) -> Created<UserRes> {
    create_in_view(&state, StaffView::Nurses, req).await
}

#[utoipa::path(
    get,
    path = "/api/nurses/{id}",
    params(("id" = i64, Path, description = "User store key")),
    responses(
        (status = 200, description = "The nurse", body = UserRes),
        (status = 404, description = "No nurse with this key")
    )
)]
#[axum::debug_handler]
pub async fn get_nurse(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> Reply<UserRes> {
    ok(state.services.staff.get_in_view(StaffView::Nurses, id)?.into())
}

#[utoipa::path(
    put,
    path = "/api/nurses/{id}",
    params(("id" = i64, Path, description = "User store key")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated nurse; role changes are ignored", body = UserRes),
        (status = 404, description = "No nurse with this key")
    )
)]
#[axum::debug_handler]
pub async fn update_nurse(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Reply<UserRes> {
    update_in_view(&state, StaffView::Nurses, id, update).await
}

#[utoipa::path(
    get,
    path = "/api/doctors/{id}/detail",
    params(("id" = i64, Path, description = "User store key")),
    responses(
        (status = 200, description = "The doctor's detail", body = DoctorDetail),
        (status = 404, description = "No doctor with this key, or no detail attached")
    )
)]
#[axum::debug_handler]
pub async fn get_doctor_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Reply<DoctorDetail> {
    ok(state.services.staff.doctor_detail(id)?)
}

#[utoipa::path(
    put,
    path = "/api/doctors/{id}/detail",
    params(("id" = i64, Path, description = "User store key")),
    request_body = NewDoctorDetail,
    responses(
        (status = 200, description = "Detail attached or replaced", body = DoctorDetail),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "No doctor with this key"),
        (status = 409, description = "License number already taken")
    )
)]
#[axum::debug_handler]
pub async fn set_doctor_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewDoctorDetail>,
) -> Reply<DoctorDetail> {
    state.services.staff.get_in_view(StaffView::Doctors, id)?;
    ok(state.services.staff.set_doctor_detail(id, req)?)
}

#[utoipa::path(
    get,
    path = "/api/nurses/{id}/detail",
    params(("id" = i64, Path, description = "User store key")),
    responses(
        (status = 200, description = "The nurse's detail", body = NurseDetail),
        (status = 404, description = "No nurse with this key, or no detail attached")
    )
)]
#[axum::debug_handler]
pub async fn get_nurse_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Reply<NurseDetail> {
    ok(state.services.staff.nurse_detail(id)?)
}

#[utoipa::path(
    put,
    path = "/api/nurses/{id}/detail",
    params(("id" = i64, Path, description = "User store key")),
    request_body = NewNurseDetail,
    responses(
        (status = 200, description = "Detail attached or replaced", body = NurseDetail),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "No nurse with this key"),
        (status = 409, description = "License number already taken")
    )
)]
#[axum::debug_handler]
pub async fn set_nurse_detail(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewNurseDetail>,
) -> Reply<NurseDetail> {
    state.services.staff.get_in_view(StaffView::Nurses, id)?;
    ok(state.services.staff.set_nurse_detail(id, req)?)
}
