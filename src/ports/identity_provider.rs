//! Identity provider port.
//!
//! The service of record for credentials, sessions, and second factors. The
//! booking and MFA flows only see this capability set; whether it is backed
//! by a hosted service or the in-process provider is a deployment choice.
//!
//! # Sign-in protocol
//!
//! ```text
//! sign_in(email, password)
//!   ├─ Authenticated(session)          → done
//!   └─ ChallengeRequired(challenge)    → resolve_mfa_challenge(challenge, code)
//!                                          ├─ Ok(session)
//!                                          └─ InvalidOrExpiredCode → retry same challenge
//! ```

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;

use crate::domain::foundation::{
    AuthError, AuthenticatedUser, ChallengeId, FactorId, Timestamp, UserId,
};
use crate::domain::mfa::{MfaChallenge, MfaError, MfaFactor, MfaSecret, TotpCode};

/// New account credentials.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub display_name: String,
}

/// An issued bearer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(skip)]
    pub user: AuthenticatedUser,
    pub access_token: String,
    pub expires_at: Timestamp,
}

/// Result of the first factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Authenticated(Session),
    /// Not a failure: the account has TOTP enrolled.
    ChallengeRequired(MfaChallenge),
}

/// Contract for the identity service.
///
/// Implementations must:
/// - Return `AuthError::InvalidCredentials` for unknown email or wrong password
///   without revealing which
/// - Return `MfaError::InvalidOrExpiredCode` for a wrong code and keep the
///   challenge open for another attempt
/// - Invalidate an earlier `secret_ref` when a new secret is generated for the
///   same user
/// - Return `ServiceUnavailable` / `Unavailable` for transient failures
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the identity record. The email starts unverified.
    async fn register(&self, registration: &Registration) -> Result<AuthenticatedUser, AuthError>;

    /// Removes an identity whose registration could not be completed, freeing
    /// its email. Removing an unknown identity succeeds.
    async fn delete_registration(&self, user_id: &UserId) -> Result<(), AuthError>;

    /// (Re)sends the verification message for an unverified account.
    async fn send_email_verification(&self, email: &str) -> Result<(), AuthError>;

    /// Consumes a verification token.
    async fn confirm_email(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignInOutcome, AuthError>;

    async fn resolve_mfa_challenge(
        &self,
        challenge_id: &ChallengeId,
        code: &TotpCode,
    ) -> Result<Session, MfaError>;

    /// Issues a fresh secret bound to the user.
    async fn generate_mfa_secret(&self, user: &AuthenticatedUser) -> Result<MfaSecret, MfaError>;

    /// Checks `code` against the pending secret and enrolls it as a factor.
    async fn verify_and_enroll(
        &self,
        user_id: &UserId,
        secret_ref: &str,
        code: &TotpCode,
    ) -> Result<MfaFactor, MfaError>;

    async fn unenroll(&self, user_id: &UserId, factor_id: &FactorId) -> Result<(), MfaError>;

    /// Enrolled factors as the provider records them.
    async fn list_factors(&self, user_id: &UserId) -> Result<Vec<MfaFactor>, MfaError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_provider_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn IdentityProvider) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn IdentityProvider>>();
    }
}
