//! Mapping of core errors onto HTTP responses.
//!
//! This is the only place that decides status codes. Every error body is the standard
//! envelope with `status: "error"`.

use api_shared::ApiResponse;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use icu_core::{ErrorKind, FieldErrors, IcuError};

#[derive(Debug)]
pub enum ApiError {
    Core(IcuError),
    /// The body, path or query string could not be read as the expected type.
    BadRequest(String),
    /// Field errors under a message other than the default "Invalid data".
    Invalid { message: String, errors: FieldErrors },
    Internal(String),
}

impl From<IcuError> for ApiError {
    fn from(e: IcuError) -> Self {
        ApiError::Core(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Core(e) => core_error_body(e),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, ApiResponse::error(message)),
            ApiError::Invalid { message, errors } => {
                (StatusCode::BAD_REQUEST, ApiResponse::invalid(message, errors))
            }
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Internal error"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn core_error_body(e: IcuError) -> (StatusCode, ApiResponse<()>) {
    match e.kind() {
        ErrorKind::NotFound => {
            let message = match &e {
                IcuError::NotFound { entity, .. } => format!("{} not found", entity),
                other => other.to_string(),
            };
            (StatusCode::NOT_FOUND, ApiResponse::error(message))
        }
        ErrorKind::Validation => {
            let errors = match e {
                IcuError::Validation(errors) => errors,
                _ => Default::default(),
            };
            (
                StatusCode::BAD_REQUEST,
                ApiResponse::invalid("Invalid data", errors),
            )
        }
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, ApiResponse::error(e.to_string())),
        ErrorKind::Constraint => (StatusCode::CONFLICT, ApiResponse::error(e.to_string())),
        ErrorKind::StorageUnavailable => {
            tracing::error!("Storage error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Storage unavailable"),
            )
        }
        ErrorKind::Internal => {
            tracing::error!("Internal error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Internal error"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icu_core::AuthFailure;

    fn status_of(e: IcuError) -> StatusCode {
        ApiError::from(e).into_response().status()
    }

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(status_of(IcuError::not_found("Patient", 1)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(IcuError::invalid("name", "blank")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AuthFailure::Inactive.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(IcuError::Constraint("duplicate".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(IcuError::StorageUnavailable("lock poisoned".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
