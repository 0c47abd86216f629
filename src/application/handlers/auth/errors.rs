//! Error type for the sign-up / sign-in flows.

use thiserror::Error;

use crate::domain::account::AccountError;
use crate::domain::foundation::{AuthError, DomainError, ValidationError};
use crate::domain::mfa::MfaError;

/// A flow touches the identity provider, the account store, and the second
/// factor. Each keeps its own error; this just carries whichever failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFlowError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Mfa(#[from] MfaError),

    #[error(transparent)]
    Account(#[from] AccountError),
}

impl From<DomainError> for AuthFlowError {
    fn from(err: DomainError) -> Self {
        AuthFlowError::Account(AccountError::from(err))
    }
}

impl From<ValidationError> for AuthFlowError {
    fn from(err: ValidationError) -> Self {
        AuthFlowError::Account(AccountError::from(err))
    }
}
