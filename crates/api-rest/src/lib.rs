//! # API REST
//!
//! HTTP surface of the ICU backend.
//!
//! Every route lives under `/api` and answers with the envelope from `api-shared`. OpenAPI
//! documentation is served at `/swagger-ui` and `/api-docs/openapi.json`.
//!
//! The router is built by [`router`] so that the standalone `icu-api-rest` binary, the
//! workspace `icu-run` binary and the tests all serve the same application.

pub mod error;
pub mod extract;
pub mod handlers;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery};

use axum::{
    routing::{get, post, put},
    Router,
};
use handlers::{alerts, auth, clinical, equipment, patients, schedules, staff};
use icu_core::Services;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::health,
        staff::list_doctors,
        staff::create_doctor,
        staff::get_doctor,
        staff::update_doctor,
        staff::list_nurses,
        staff::create_nurse,
        staff::get_nurse,
        staff::update_nurse,
        staff::get_doctor_detail,
        staff::set_doctor_detail,
        staff::get_nurse_detail,
        staff::set_nurse_detail,
        patients::list_patients,
        patients::create_patient,
        patients::get_patient,
        patients::update_patient,
        patients::delete_patient,
        clinical::list_vitals,
        clinical::record_vitals,
        clinical::list_prescriptions,
        clinical::prescribe,
        clinical::update_prescription,
        clinical::list_treatments,
        clinical::create_treatment,
        clinical::update_treatment,
        clinical::list_admissions,
        clinical::record_admission,
        clinical::list_history,
        clinical::append_history,
        alerts::list_alerts,
        alerts::raise_alert,
        alerts::acknowledge_alerts,
        equipment::list_equipment,
        equipment::register_equipment,
        equipment::get_equipment,
        equipment::update_equipment,
        schedules::list_schedules,
        schedules::create_schedule,
        schedules::update_schedule,
        schedules::delete_schedule,
    ),
    components(schemas(
        api_shared::LoginReq,
        api_shared::UserRes,
        api_shared::HealthRes,
        api_shared::ResponseStatus,
        api_shared::AcknowledgeReq,
        icu_core::models::Role,
        icu_core::models::Shift,
        icu_core::models::NewUser,
        icu_core::models::UserUpdate,
        icu_core::models::Specialization,
        icu_core::models::DoctorDetail,
        icu_core::models::NewDoctorDetail,
        icu_core::models::NurseDetail,
        icu_core::models::NewNurseDetail,
        icu_core::models::Gender,
        icu_core::models::PatientStatus,
        icu_core::models::Patient,
        icu_core::models::NewPatient,
        icu_core::models::PatientUpdate,
        icu_core::models::Vitals,
        icu_core::models::NewVitals,
        icu_core::models::Route,
        icu_core::models::PrescriptionStatus,
        icu_core::models::Prescription,
        icu_core::models::NewPrescription,
        icu_core::models::PrescriptionUpdate,
        icu_core::models::TreatmentPriority,
        icu_core::models::TreatmentStatus,
        icu_core::models::Treatment,
        icu_core::models::NewTreatment,
        icu_core::models::TreatmentUpdate,
        icu_core::models::AdmissionType,
        icu_core::models::Admission,
        icu_core::models::NewAdmission,
        icu_core::models::ActionType,
        icu_core::models::TreatmentHistory,
        icu_core::models::NewHistoryEntry,
        icu_core::models::AlertSeverity,
        icu_core::models::Alert,
        icu_core::models::NewAlert,
        icu_core::models::EquipmentStatus,
        icu_core::models::Equipment,
        icu_core::models::NewEquipment,
        icu_core::models::EquipmentUpdate,
        icu_core::models::Schedule,
        icu_core::models::NewSchedule,
        icu_core::models::ScheduleUpdate,
    ))
)]
pub struct ApiDoc;

/// Build the application: `/api` routes, Swagger UI and a permissive CORS layer.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/login", post(auth::login))
        .route("/health", get(auth::health))
        .route("/doctors", get(staff::list_doctors).post(staff::create_doctor))
        .route("/doctors/:id", get(staff::get_doctor).put(staff::update_doctor))
        .route("/nurses", get(staff::list_nurses).post(staff::create_nurse))
        .route("/nurses/:id", get(staff::get_nurse).put(staff::update_nurse))
        .route(
            "/doctors/:id/detail",
            get(staff::get_doctor_detail).put(staff::set_doctor_detail),
        )
        .route(
            "/nurses/:id/detail",
            get(staff::get_nurse_detail).put(staff::set_nurse_detail),
        )
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/patients/:id/vitals",
            get(clinical::list_vitals).post(clinical::record_vitals),
        )
        .route(
            "/patients/:id/prescriptions",
            get(clinical::list_prescriptions).post(clinical::prescribe),
        )
        .route("/prescriptions/:id", put(clinical::update_prescription))
        .route(
            "/patients/:id/treatments",
            get(clinical::list_treatments).post(clinical::create_treatment),
        )
        .route("/treatments/:id", put(clinical::update_treatment))
        .route(
            "/patients/:id/admissions",
            get(clinical::list_admissions).post(clinical::record_admission),
        )
        .route(
            "/patients/:id/history",
            get(clinical::list_history).post(clinical::append_history),
        )
        .route("/alerts", get(alerts::list_alerts).post(alerts::raise_alert))
        .route("/alerts/acknowledge", post(alerts::acknowledge_alerts))
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::register_equipment),
        )
        .route(
            "/equipment/:id",
            get(equipment::get_equipment).put(equipment::update_equipment),
        )
        .route(
            "/schedules",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/schedules/:id",
            put(schedules::update_schedule).delete(schedules::delete_schedule),
        );

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use icu_core::{CoreConfig, Store};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let services = Services::new(Store::in_memory(), Arc::new(CoreConfig::in_memory()));
        router(AppState::new(services))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn created_patient_reads_back_with_defaults() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"name": "Jane Doe", "age": 42, "gender": "F"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        let created = &body["data"];
        assert_eq!(created["status"], "STABLE");
        assert!(created["patient_id"].as_str().unwrap().starts_with("PAT"));

        let uri = format!("/api/patients/{}", created["id"]);
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let fetched = &body["data"];
        assert_eq!(fetched["name"], "Jane Doe");
        assert_eq!(fetched["age"], 42);
        assert_eq!(fetched["gender"], "F");
        assert_eq!(fetched["patient_id"], created["patient_id"]);
        assert!(fetched["created_at"].is_string());
        assert!(fetched["updated_at"].is_string());
    }

    #[tokio::test]
    async fn doctor_claiming_nurse_role_is_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/doctors",
            Some(json!({"username": "drgrey", "password": "s3cret", "role": "NURSE"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["role"], "DOCTOR");
        assert!(body["data"].get("password").is_none());

        let (status, body) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({"username": "drgrey", "password": "s3cret", "role": "NURSE"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Role mismatch");

        let (status, body) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({"username": "drgrey", "password": "s3cret", "role": "doctor"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["username"], "drgrey");
    }

    #[tokio::test]
    async fn login_reports_missing_fields_and_bad_passwords() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/login", Some(json!({"username": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All fields are required");
        assert!(body["errors"]["password"].is_array());

        let (status, body) = send(
            &app,
            "POST",
            "/api/login",
            Some(json!({"username": "nobody", "password": "pw", "role": "ADMIN"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn invalid_and_malformed_bodies_are_bad_requests() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"name": "  ", "age": 42, "gender": "F"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid data");
        assert!(body["errors"]["name"].is_array());

        let (status, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"name": "Jane Doe", "age": "forty", "gender": "F"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn deleted_patient_is_gone() {
        let app = app();
        let (_, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"name": "John Roe", "age": 60, "gender": "M"})),
        )
        .await;
        let uri = format!("/api/patients/{}", body["data"]["id"]);

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Patient deleted");

        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Patient not found");
        let (status, _) = send(&app, "GET", &format!("{}/vitals", uri), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn alerts_are_acknowledged_in_bulk() {
        let app = app();
        let (_, nurse) = send(
            &app,
            "POST",
            "/api/nurses",
            Some(json!({"username": "nurse1", "password": "pw"})),
        )
        .await;
        let (status, alert) = send(
            &app,
            "POST",
            "/api/alerts",
            Some(json!({"severity": "CRITICAL", "title": "Desaturation", "message": "SpO2 84%"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(alert["data"]["alert_id"].as_str().unwrap().starts_with("ALT"));

        let ack = json!({"alert_ids": [alert["data"]["id"]], "acknowledged_by": nurse["data"]["id"]});
        let (status, body) = send(&app, "POST", "/api/alerts/acknowledge", Some(ack.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["acknowledged"], true);
        let (status, _) = send(&app, "POST", "/api/alerts/acknowledge", Some(ack)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, open) = send(&app, "GET", "/api/alerts?acknowledged=false", None).await;
        assert_eq!(open["data"], json!([]));

        let (status, body) = send(
            &app,
            "POST",
            "/api/alerts/acknowledge",
            Some(json!({"alert_ids": [999], "acknowledged_by": nurse["data"]["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["alert_ids"].is_array());
    }

    #[tokio::test]
    async fn duplicate_equipment_tag_conflicts() {
        let app = app();
        let vent = json!({
            "equipment_id": "VENT-1",
            "name": "Hamilton C6",
            "equipment_type": "Ventilator",
            "location": "ICU-1"
        });
        let (status, _) = send(&app, "POST", "/api/equipment", Some(vent.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, "POST", "/api/equipment", Some(vent)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn health_reports_memory_store() {
        let (status, body) = send(&app(), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["ok"], true);
    }

    #[tokio::test]
    async fn health_is_unavailable_without_snapshot_directory() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let data_dir = dir.path().join("data");
        let services = Services::open(Arc::new(CoreConfig::with_data_dir(&data_dir))).unwrap();
        let app = router(AppState::new(services));

        let (status, _) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);

        std::fs::remove_dir_all(&data_dir).expect("Failed to remove data dir");
        let (status, body) = send(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");
        assert_eq!(body["data"]["ok"], false);
    }

    #[tokio::test]
    async fn bad_path_and_query_values_use_the_envelope() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/patients/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());

        let (status, body) = send(&app, "GET", "/api/alerts?acknowledged=maybe", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn patient_update_goes_through_the_router() {
        let app = app();
        let (_, nurse) = send(
            &app,
            "POST",
            "/api/nurses",
            Some(json!({"username": "nurse1", "password": "pw"})),
        )
        .await;
        let (_, body) = send(
            &app,
            "POST",
            "/api/patients",
            Some(json!({"name": "Jane Doe", "age": 42, "gender": "F"})),
        )
        .await;
        let uri = format!("/api/patients/{}", body["data"]["id"]);
        let patient_id = body["data"]["patient_id"].clone();

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"status": "CRITICAL", "room_number": "12"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "CRITICAL");
        assert_eq!(body["data"]["room_number"], "12");
        assert_eq!(body["data"]["name"], "Jane Doe");
        assert_eq!(body["data"]["patient_id"], patient_id);

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"attending_physician": nurse["data"]["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["attending_physician"].is_array());

        let (status, body) = send(&app, "PUT", "/api/patients/999", Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Patient not found");
    }

    #[tokio::test]
    async fn doctor_detail_is_set_and_read_through_the_view() {
        let app = app();
        let (_, doctor) = send(
            &app,
            "POST",
            "/api/doctors",
            Some(json!({"username": "drgrey", "password": "pw"})),
        )
        .await;
        let (_, nurse) = send(
            &app,
            "POST",
            "/api/nurses",
            Some(json!({"username": "nurse1", "password": "pw"})),
        )
        .await;
        let doctor_uri = format!("/api/doctors/{}/detail", doctor["data"]["id"]);

        let (status, body) = send(&app, "GET", &doctor_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Doctor detail not found");

        let detail = json!({
            "specialization": "CRITICAL_CARE",
            "department": "ICU",
            "license_number": "GMC-1"
        });
        let (status, body) = send(&app, "PUT", &doctor_uri, Some(detail.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["license_number"], "GMC-1");

        let (status, body) = send(&app, "GET", &doctor_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["specialization"], "CRITICAL_CARE");

        let nurse_as_doctor = format!("/api/doctors/{}/detail", nurse["data"]["id"]);
        let (status, body) = send(&app, "PUT", &nurse_as_doctor, Some(detail)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Doctor not found");

        let nurse_uri = format!("/api/nurses/{}/detail", nurse["data"]["id"]);
        let (status, body) = send(
            &app,
            "PUT",
            &nurse_uri,
            Some(json!({"department": "ICU", "shift": "NIGHT", "license_number": "RN-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["shift"], "NIGHT");
    }
}
