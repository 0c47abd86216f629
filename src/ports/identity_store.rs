//! Identity store port.
//!
//! Durable records behind the local identity provider: credentials,
//! verification tokens, pending TOTP secrets, and enrolled factors. Sign-in
//! challenges are short-lived and stay with the provider.

use async_trait::async_trait;

use crate::domain::foundation::{AuthenticatedUser, DomainError, FactorId, Timestamp, UserId};
use crate::domain::mfa::{MfaFactor, TotpSecret};

/// Credentials for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub user: AuthenticatedUser,
    /// PHC-format password hash.
    pub password_hash: String,
    pub created_at: Timestamp,
}

/// A TOTP secret issued for enrollment but not yet confirmed with a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSecret {
    pub secret_ref: String,
    pub secret: TotpSecret,
}

/// An enrolled TOTP factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorRecord {
    pub factor: MfaFactor,
    pub secret: TotpSecret,
    /// Highest time step accepted for this factor. Codes at or below it are
    /// spent.
    pub last_counter: u64,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// # Errors
    ///
    /// - `DuplicateRecord` if the uid or email (case-insensitive) is taken
    async fn insert(&self, record: &IdentityRecord) -> Result<(), DomainError>;

    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<IdentityRecord>, DomainError>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DomainError>;

    /// Removes the identity with its tokens, secrets, and factors. Deleting a
    /// missing identity succeeds.
    async fn delete(&self, uid: &UserId) -> Result<(), DomainError>;

    /// Stores `token` as the only live verification token for `uid`.
    async fn replace_verification_token(&self, uid: &UserId, token: &str)
        -> Result<(), DomainError>;

    async fn verification_token_for(&self, uid: &UserId) -> Result<Option<String>, DomainError>;

    /// Deletes `token` and marks its owner's email verified in one step.
    /// `None` if the token is unknown or already used.
    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedUser>, DomainError>;

    /// Stores `pending` for `uid`, replacing any earlier pending secret.
    async fn replace_pending_secret(
        &self,
        uid: &UserId,
        pending: &PendingSecret,
    ) -> Result<(), DomainError>;

    async fn pending_secret(&self, uid: &UserId) -> Result<Option<PendingSecret>, DomainError>;

    /// Drops the pending secret named by `secret_ref` and stores `factor` in
    /// its place. Returns false, storing nothing, if that secret is no longer
    /// pending.
    async fn enroll_factor(
        &self,
        uid: &UserId,
        secret_ref: &str,
        factor: &FactorRecord,
    ) -> Result<bool, DomainError>;

    async fn factors(&self, uid: &UserId) -> Result<Vec<FactorRecord>, DomainError>;

    /// Returns false if `uid` has no such factor.
    async fn remove_factor(&self, uid: &UserId, factor_id: &FactorId)
        -> Result<bool, DomainError>;

    /// Marks `counter` spent if it is newer than the factor's last accepted
    /// step. Returns false for a replayed or stale step, or a missing factor.
    async fn advance_factor_counter(
        &self,
        factor_id: &FactorId,
        counter: u64,
    ) -> Result<bool, DomainError>;
}
