//! Stable string error codes, shared across the API surface.

pub const VALIDATION_ERROR: &str = "STRIDE_VALIDATION";
pub const STORAGE_ERROR: &str = "STRIDE_STORAGE";
pub const CORRUPT_STATE: &str = "STRIDE_CORRUPT_STATE";
pub const NOT_FOUND: &str = "STRIDE_NOT_FOUND";
pub const CONFIG_ERROR: &str = "STRIDE_CONFIG";

/// Maps an error to a stable string code callers can match on
/// without depending on message text.
pub trait StrideErrorCode {
    fn error_code(&self) -> &'static str;
}
