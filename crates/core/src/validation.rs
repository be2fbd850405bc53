//! Input validation utilities.
//!
//! Services collect every field problem in a [`Validator`] and fail once with the full set,
//! so callers see all errors for a payload rather than only the first.

use crate::error::FieldErrors;
use crate::{IcuError, IcuResult};
use icu_types::{NonEmptyText, TextError};

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Require non-blank text of at most `max` characters, returning it trimmed.
    pub fn required(&mut self, field: &str, value: &str, max: usize) -> String {
        match NonEmptyText::bounded(value, max) {
            Ok(text) => text.into_inner(),
            Err(TextError::Empty) => {
                self.push(field, "This field may not be blank.");
                String::new()
            }
            Err(TextError::TooLong { max }) => {
                self.push(field, too_long(max));
                String::new()
            }
        }
    }

    /// Optional text: empty is allowed, but the length is still bounded.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, too_long(max));
        }
    }

    pub fn range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(
                field,
                format!("Ensure this value is between {} and {}.", min, max),
            );
        }
    }

    /// Temperatures are stored with one decimal place and must stay below 1000 in magnitude.
    pub fn temperature(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value.abs() >= crate::constants::MAX_TEMPERATURE {
            self.push(field, "Ensure that there are no more than 4 digits in total.");
            return;
        }
        let tenths = value * 10.0;
        if (tenths - tenths.round()).abs() > 1e-6 {
            self.push(field, "Ensure that there are no more than 1 decimal places.");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> IcuResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IcuError::Validation(self.errors))
        }
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}
