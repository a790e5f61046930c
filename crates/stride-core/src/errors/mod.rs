//! Error handling for Stride.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod engine_error;
pub mod error_code;
pub mod not_found_error;
pub mod storage_error;
pub mod validation_error;

pub use config_error::ConfigError;
pub use engine_error::EngineError;
pub use error_code::StrideErrorCode;
pub use not_found_error::NotFoundError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;
