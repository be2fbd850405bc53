//! The JSON envelope wrapped around every API response.
//!
//! ```json
//! {"status": "success", "message": "Patient created", "data": {...}}
//! {"status": "error", "message": "Invalid data", "errors": {"name": ["..."]}}
//! ```
//!
//! Absent parts are omitted rather than sent as `null`.

use icu_core::FieldErrors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<()> {
    /// A success carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    /// An error with field-level detail.
    pub fn invalid(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::error(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_parts_are_omitted() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(body, json!({"status": "success", "data": [1, 2]}));

        let body = serde_json::to_value(ApiResponse::error("Patient not found")).unwrap();
        assert_eq!(body, json!({"status": "error", "message": "Patient not found"}));
    }

    #[test]
    fn field_errors_are_lists_per_field() {
        let mut errors = FieldErrors::new();
        errors.insert("name".into(), vec!["This field may not be blank.".into()]);
        let body = serde_json::to_value(ApiResponse::invalid("Invalid data", errors)).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["errors"]["name"][0], "This field may not be blank.");
    }
}
