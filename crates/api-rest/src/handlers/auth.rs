use super::{blocking, ok_with, Reply};
use crate::{error::ApiError, extract::ApiJson, AppState};
use api_shared::{ApiResponse, HealthRes, HealthService, LoginReq, ResponseStatus, UserRes};
use axum::{extract::State, http::StatusCode, Json};
use icu_core::IcuError;

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login successful; data is the user profile", body = UserRes),
        (status = 400, description = "A field is missing"),
        (status = 401, description = "Invalid username or password, role mismatch, or inactive account")
    )
)]
/// Check credentials and the claimed role.
///
/// No session or token is issued; the caller receives the public profile only.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginReq>,
) -> Reply<UserRes> {
    let auth = state.services.auth.clone();
    let result = blocking(move || auth.login(&req.username, &req.password, &req.role)).await?;
    match result {
        Ok(user) => ok_with("Login successful", UserRes::from(user)),
        Err(IcuError::Validation(errors)) => Err(ApiError::Invalid {
            message: "All fields are required".into(),
            errors,
        }),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Store is available", body = HealthRes),
        (status = 503, description = "Store is unavailable", body = HealthRes)
    )
)]
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthRes>>) {
    let health = HealthService::check(&state.services.store);
    let (code, status) = if health.ok {
        (StatusCode::OK, ResponseStatus::Success)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ResponseStatus::Error)
    };
    (
        code,
        Json(ApiResponse {
            status,
            message: Some(health.message.clone()),
            data: Some(health),
            errors: None,
        }),
    )
}
