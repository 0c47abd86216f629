//! MFA error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

use super::MfaState;

/// Errors raised by TOTP enrollment, verification, and sign-in challenges.
///
/// `InvalidOrExpiredCode` is kept apart from everything else so callers can
/// tell the user to fetch a fresh code rather than report a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MfaError {
    /// Code is not exactly six digits. Never reaches the provider.
    #[error("Enter the 6-digit code from your authenticator app")]
    InvalidCodeFormat,

    #[error("The code is invalid or has expired; enter a fresh code")]
    InvalidOrExpiredCode,

    #[error("The sign-in challenge has expired; sign in again")]
    ChallengeExpired,

    #[error("Unknown sign-in challenge")]
    ChallengeNotFound,

    /// Too many wrong codes against one challenge.
    #[error("Too many attempts; sign in again")]
    TooManyAttempts,

    /// The secret was replaced or never issued.
    #[error("Enrollment secret is no longer valid; start enrollment again")]
    UnknownSecret,

    #[error("No second factor is enrolled")]
    NotEnrolled,

    /// Provider refused the request for a non-code reason.
    #[error("MFA provider error: {0}")]
    Provider(String),

    /// Network or timeout talking to the provider.
    #[error("MFA service unavailable: {0}")]
    Unavailable(String),

    #[error("Cannot {action} while {state:?}")]
    InvalidStep { state: MfaState, action: &'static str },
}

impl MfaError {
    pub fn invalid_step(state: MfaState, action: &'static str) -> Self {
        MfaError::InvalidStep { state, action }
    }

    /// Rejections of the code itself, as opposed to faults.
    pub fn is_code_rejection(&self) -> bool {
        matches!(self, MfaError::InvalidOrExpiredCode | MfaError::InvalidCodeFormat)
    }

    /// The challenge is gone and the first factor must be repeated.
    pub fn requires_new_sign_in(&self) -> bool {
        matches!(
            self,
            MfaError::ChallengeExpired | MfaError::ChallengeNotFound | MfaError::TooManyAttempts
        )
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, MfaError::Unavailable(_))
    }
}

impl From<DomainError> for MfaError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Timeout | ErrorCode::ServiceUnavailable => MfaError::Unavailable(err.message),
            _ => MfaError::Provider(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_rejections_are_distinct_from_faults() {
        assert!(MfaError::InvalidOrExpiredCode.is_code_rejection());
        assert!(!MfaError::Unavailable("timeout".into()).is_code_rejection());
        assert!(!MfaError::Provider("boom".into()).is_code_rejection());
    }

    #[test]
    fn expired_challenges_require_new_sign_in() {
        assert!(MfaError::ChallengeExpired.requires_new_sign_in());
        assert!(MfaError::TooManyAttempts.requires_new_sign_in());
        assert!(!MfaError::InvalidOrExpiredCode.requires_new_sign_in());
    }

    #[test]
    fn transient_domain_errors_become_unavailable() {
        let err: MfaError = DomainError::timeout("generate secret").into();
        assert!(err.is_transient());
    }
}
