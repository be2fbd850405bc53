use super::{created, ok, Created, Reply};
use crate::{error::ApiError, extract::{ApiJson, ApiPath}, AppState};
use api_shared::ApiResponse;
use axum::{
    extract::State,
    Json,
};
use icu_core::models::{NewPatient, Patient, PatientUpdate, RowId};

#[utoipa::path(
    get,
    path = "/api/patients",
    responses((status = 200, description = "Patients, most recent admission first", body = [Patient]))
)]
#[axum::debug_handler]
pub async fn list_patients(State(state): State<AppState>) -> Reply<Vec<Patient>> {
    ok(state.services.patients.list()?)
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = NewPatient,
    responses(
        (status = 201, description = "Patient created with a PAT identifier", body = Patient),
        (status = 400, description = "Invalid data")
    )
)]
/// Register a patient.
///
/// Only `name`, `age` and `gender` are required. Status defaults to `STABLE` and the
/// admission date to now.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewPatient>,
) -> Created<Patient> {
    let patient = state.services.patients.create(req)?;
    tracing::info!("Created patient {}", patient.patient_id);
    created("Patient created", patient)
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "The patient", body = Patient),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn get_patient(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> Reply<Patient> {
    ok(state.services.patients.get(id)?)
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = i64, Path, description = "Patient store key")),
    request_body = PatientUpdate,
    responses(
        (status = 200, description = "Updated patient; the PAT identifier never changes", body = Patient),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<PatientUpdate>,
) -> Reply<Patient> {
    ok(state.services.patients.update(id, update)?)
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "Patient and dependent records deleted"),
        (status = 404, description = "Patient not found")
    )
)]
/// Delete a patient along with their vitals, prescriptions, treatments, admissions, history
/// and alerts. Equipment assigned to the patient is released.
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let patient = state.services.patients.delete(id)?;
    tracing::info!("Deleted patient {}", patient.patient_id);
    Ok(Json(ApiResponse::message("Patient deleted")))
}
