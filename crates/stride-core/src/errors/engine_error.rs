//! Engine-level error aggregation.

use super::error_code::StrideErrorCode;
use super::{NotFoundError, StorageError, ValidationError};

/// Errors surfaced by engine operations.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),
}

impl StrideErrorCode for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::NotFound(e) => e.error_code(),
        }
    }
}
