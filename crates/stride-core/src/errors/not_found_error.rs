//! Lookup errors.

use super::error_code::{self, StrideErrorCode};

/// Errors for operations that require an existing id.
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("Course {course_id} not found in catalog")]
    CourseNotFound { course_id: String },
}

impl StrideErrorCode for NotFoundError {
    fn error_code(&self) -> &'static str {
        error_code::NOT_FOUND
    }
}
