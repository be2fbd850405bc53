//! Human-readable record identifiers.
//!
//! ICU records that are referred to by staff (patients, prescriptions, treatments, admissions,
//! history entries and alerts) carry an identifier of the form `<PREFIX><TIMESTAMP>`, for
//! example `PAT20260111143522045`.
//!
//! ## Timestamp encoding
//! The timestamp is the UTC moment of first persistence encoded as `YYYYMMDDHHMMSSmmm`:
//! year, month, day, hour, minute, second and milliseconds, zero-padded, no separators.
//! Every identifier is therefore the prefix followed by exactly 17 digits.
//!
//! ## Uniqueness
//! A plain clock reading is not enough to keep identifiers unique when two records of the
//! same type are created in the same millisecond. [`IdGenerator`] remembers the last
//! identifier issued per prefix and, when the clock has not moved past it, issues the last
//! timestamp plus one millisecond instead. Identifiers of one prefix are therefore strictly
//! increasing in the order they were issued.
//!
//! The generator is expected to be driven under the same lock as the write that persists the
//! record, so that assignment and first save happen together.

mod generator;

pub use generator::{IdGenerator, IdPrefix, RecordId};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
