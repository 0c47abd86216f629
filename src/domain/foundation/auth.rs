//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what the rest of the system sees once a bearer token
//! (or a completed second-factor challenge) has been accepted. It carries no
//! provider-specific claims; any identity adapter can populate it.

use super::{DomainError, ErrorCode, UserId};
use thiserror::Error;

/// Authenticated user extracted from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the identity provider.
    pub id: UserId,

    /// Email address the account signed in with.
    pub email: String,

    /// Display name if the account has one.
    pub display_name: Option<String>,

    /// Whether the email address has been confirmed.
    pub email_verified: bool,
}

impl AuthenticatedUser {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            email_verified,
        }
    }

    /// Returns the user's display name, or email as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Authentication errors.
///
/// A second-factor challenge is deliberately absent: it is an outcome of
/// sign-in, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Email/password pair did not match an account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-in refused until the address is confirmed.
    #[error("Email address has not been verified")]
    EmailNotVerified,

    /// Registration attempted for an email that already has an account.
    #[error("An account already exists for this email")]
    AccountExists,

    /// Token is valid but the user no longer exists in the system.
    #[error("User not found")]
    UserNotFound,

    /// User exists but lacks required permissions for this action.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Request payload rejected before reaching the provider.
    #[error("{0}")]
    InvalidInput(String),

    /// The identity service is unavailable (network, timeout, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

impl From<DomainError> for AuthError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateRecord => AuthError::AccountExists,
            _ => AuthError::ServiceUnavailable(err.message),
        }
    }
}
