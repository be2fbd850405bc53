//! Per-patient clinical records: vitals, prescriptions, treatments, admissions and the
//! treatment history audit trail.
//!
//! Records are listed and created under `/patients/{id}/...`; prescriptions and treatments
//! are updated through their own key.

use super::{created, ok, Created, Reply};
use crate::{extract::{ApiJson, ApiPath}, AppState};
use axum::extract::State;
use icu_core::models::{
    Admission, NewAdmission, NewHistoryEntry, NewPrescription, NewTreatment, NewVitals,
    Prescription, PrescriptionUpdate, RowId, Treatment, TreatmentHistory, TreatmentUpdate,
    Vitals,
};

#[utoipa::path(
    get,
    path = "/api/patients/{id}/vitals",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "Vitals, newest first", body = [Vitals]),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn list_vitals(State(state): State<AppState>, ApiPath(id): ApiPath<RowId>) -> Reply<Vec<Vitals>> {
    ok(state.services.clinical.list_vitals(id)?)
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/vitals",
    params(("id" = i64, Path, description = "Patient store key")),
    request_body = NewVitals,
    responses(
        (status = 201, description = "Vitals recorded", body = Vitals),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn record_vitals(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewVitals>,
) -> Created<Vitals> {
    created("Vitals recorded", state.services.clinical.record_vitals(id, req)?)
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/prescriptions",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "Prescriptions, newest first", body = [Prescription]),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Reply<Vec<Prescription>> {
    ok(state.services.clinical.list_prescriptions(id)?)
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/prescriptions",
    params(("id" = i64, Path, description = "Patient store key")),
    request_body = NewPrescription,
    responses(
        (status = 201, description = "Prescription created with an RX identifier", body = Prescription),
        (status = 400, description = "Invalid data, including a prescriber who is not a doctor"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn prescribe(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewPrescription>,
) -> Created<Prescription> {
    let rx = state.services.clinical.prescribe(id, req)?;
    tracing::info!("Prescription {} for patient {}", rx.prescription_id, id);
    created("Prescription created", rx)
}

#[utoipa::path(
    put,
    path = "/api/prescriptions/{id}",
    params(("id" = i64, Path, description = "Prescription store key")),
    request_body = PrescriptionUpdate,
    responses(
        (status = 200, description = "Updated prescription", body = Prescription),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Prescription not found")
    )
)]
#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<PrescriptionUpdate>,
) -> Reply<Prescription> {
    ok(state.services.clinical.update_prescription(id, update)?)
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/treatments",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "Treatments", body = [Treatment]),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn list_treatments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Reply<Vec<Treatment>> {
    ok(state.services.clinical.list_treatments(id)?)
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/treatments",
    params(("id" = i64, Path, description = "Patient store key")),
    request_body = NewTreatment,
    responses(
        (status = 201, description = "Treatment created with a TRT identifier", body = Treatment),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn create_treatment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewTreatment>,
) -> Created<Treatment> {
    created("Treatment created", state.services.clinical.create_treatment(id, req)?)
}

#[utoipa::path(
    put,
    path = "/api/treatments/{id}",
    params(("id" = i64, Path, description = "Treatment store key")),
    request_body = TreatmentUpdate,
    responses(
        (status = 200, description = "Updated treatment", body = Treatment),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Treatment not found")
    )
)]
#[axum::debug_handler]
pub async fn update_treatment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(update): ApiJson<TreatmentUpdate>,
) -> Reply<Treatment> {
    ok(state.services.clinical.update_treatment(id, update)?)
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/admissions",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "Admissions", body = [Admission]),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn list_admissions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Reply<Vec<Admission>> {
    ok(state.services.clinical.list_admissions(id)?)
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/admissions",
    params(("id" = i64, Path, description = "Patient store key")),
    request_body = NewAdmission,
    responses(
        (status = 201, description = "Admission recorded with an ADM identifier", body = Admission),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn record_admission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewAdmission>,
) -> Created<Admission> {
    created("Admission recorded", state.services.clinical.record_admission(id, req)?)
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/history",
    params(("id" = i64, Path, description = "Patient store key")),
    responses(
        (status = 200, description = "History entries, newest first", body = [TreatmentHistory]),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn list_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
) -> Reply<Vec<TreatmentHistory>> {
    ok(state.services.clinical.list_history(id)?)
}

#[utoipa::path(
    post,
    path = "/api/patients/{id}/history",
    params(("id" = i64, Path, description = "Patient store key")),
    request_body = NewHistoryEntry,
    responses(
        (status = 201, description = "History entry appended with a HIST identifier", body = TreatmentHistory),
        (status = 400, description = "Invalid data, including records of another patient"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn append_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<RowId>,
    ApiJson(req): ApiJson<NewHistoryEntry>,
) -> Created<TreatmentHistory> {
    created("History entry recorded", state.services.clinical.append_history(id, req)?)
}
