//! # API Shared
//!
//! Shared definitions for the ICU APIs.
//!
//! Contains:
//! - the response envelope every endpoint returns (`ApiResponse`)
//! - request and response types that are not core entities (`LoginReq`, `UserRes`, ...)
//! - shared services like `HealthService`
//!
//! Used by `api-rest`.

pub mod auth;
pub mod envelope;
pub mod health;
pub mod requests;

pub use auth::{LoginReq, UserRes};
pub use envelope::{ApiResponse, ResponseStatus};
pub use health::{HealthRes, HealthService};
pub use requests::{AcknowledgeReq, AlertQuery};
