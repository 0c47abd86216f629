//! Password hashing port.

use crate::domain::foundation::AuthError;

pub trait PasswordHasher: Send + Sync {
    /// Returns a self-describing hash string (algorithm, params, salt).
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` for a wrong password; `Err` only if `hash` is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
