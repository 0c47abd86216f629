//! Account error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// No profile record for an authenticated identity. Never defaulted to
    /// a client role.
    #[error("Account not found: {0}")]
    NotFound(UserId),

    #[error("An account already exists for {0}")]
    AlreadyExists(String),

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Account store error: {}", .0.message)]
    Backend(DomainError),
}

impl AccountError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AccountError::NotFound(_) => ErrorCode::AccountNotFound,
            AccountError::AlreadyExists(_) => ErrorCode::DuplicateRecord,
            AccountError::Validation { .. } => ErrorCode::ValidationFailed,
            AccountError::Backend(err) => err.code,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AccountError::Backend(err) if err.is_transient())
    }
}

impl From<ValidationError> for AccountError {
    fn from(err: ValidationError) -> Self {
        AccountError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        AccountError::Backend(err)
    }
}
