//! Request handlers, one module per resource.
//!
//! Handlers are thin: pull the path, query and body apart, call one core service, and wrap
//! the result in the envelope. Status codes for failures come from [`ApiError`].

pub mod alerts;
pub mod auth;
pub mod clinical;
pub mod equipment;
pub mod patients;
pub mod schedules;
pub mod staff;

use crate::error::ApiError;
use api_shared::ApiResponse;
use axum::{http::StatusCode, Json};

pub type Reply<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn ok<T>(data: T) -> Reply<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub(crate) fn ok_with<T>(message: impl Into<String>, data: T) -> Reply<T> {
    Ok(Json(ApiResponse::success_with_message(message, data)))
}

pub(crate) fn created<T>(message: impl Into<String>, data: T) -> Created<T> {
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(message, data)),
    ))
}

/// Run CPU-bound core work (password hashing) off the async workers.
pub(crate) async fn blocking<F, R>(f: F) -> Result<R, ApiError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}
