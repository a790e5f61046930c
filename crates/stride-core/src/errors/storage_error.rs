//! Persistence errors.

use super::error_code::{self, StrideErrorCode};

/// Errors from the persistence layer.
///
/// `CorruptPayload` is special-cased on load: the engine discards the
/// payload, falls back to defaults, and logs; it never propagates out
/// of a load path. Write-side errors always propagate so callers can
/// warn that progress may not be durable.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Write failed for key {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("Failed to serialize payload for key {key}: {message}")]
    Serialize { key: String, message: String },

    #[error("Corrupt payload under key {key}: {message}")]
    CorruptPayload { key: String, message: String },
}

impl StrideErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CorruptPayload { .. } => error_code::CORRUPT_STATE,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
