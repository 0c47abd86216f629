//! TOTP code generation port.

use crate::domain::mfa::{MfaError, TotpCode, TotpSecret};

/// Computes and checks time-based codes for a shared secret.
///
/// Synchronous: it is pure computation over the secret and a unix time.
pub trait TotpGenerator: Send + Sync {
    /// Code for the time step containing `unix_secs`.
    fn generate_at(&self, secret: &TotpSecret, unix_secs: u64) -> Result<TotpCode, MfaError>;

    /// Time-step counter that `code` matches within the configured skew of
    /// `unix_secs`, or `None`. Comparison is constant-time.
    ///
    /// Callers record the returned step so the same code is not accepted
    /// twice.
    fn verify_at(&self, secret: &TotpSecret, code: &TotpCode, unix_secs: u64) -> Option<u64>;
}
