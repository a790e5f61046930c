//! Validation errors.

use super::error_code::{self, StrideErrorCode};

/// Errors raised when a caller-supplied value fails validation.
/// The rejected call is a no-op: prior state is preserved.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("XP amount must be positive, got {amount}")]
    NonPositiveXp { amount: i64 },

    #[error("Unknown value {value:?} for {field}")]
    UnknownEnumValue { field: &'static str, value: String },

    #[error("{metric} must be within [0, 100], got {value}")]
    MetricOutOfRange { metric: &'static str, value: f64 },
}

impl StrideErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }
}
