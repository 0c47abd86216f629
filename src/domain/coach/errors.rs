//! Coach error types.

use thiserror::Error;

use crate::domain::foundation::{CoachId, DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoachError {
    #[error("Coach not found: {0}")]
    NotFound(CoachId),

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Only admins and owners manage coaches.
    #[error("You do not have permission to manage coaches")]
    Forbidden,

    #[error("Coach store error: {}", .0.message)]
    Backend(DomainError),
}

impl CoachError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoachError::NotFound(_) => ErrorCode::CoachNotFound,
            CoachError::Validation { .. } => ErrorCode::ValidationFailed,
            CoachError::Forbidden => ErrorCode::Forbidden,
            CoachError::Backend(err) => err.code,
        }
    }
}

impl From<ValidationError> for CoachError {
    fn from(err: ValidationError) -> Self {
        CoachError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for CoachError {
    fn from(err: DomainError) -> Self {
        CoachError::Backend(err)
    }
}
