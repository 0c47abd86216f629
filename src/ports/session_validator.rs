//! Bearer token validation port.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Turns the token from an `Authorization: Bearer` header into the caller's
/// identity.
///
/// `InvalidToken` covers malformed and badly signed tokens, `TokenExpired`
/// tokens past their lifetime, and `ServiceUnavailable` a backend that could
/// not be reached.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `token` excludes the `Bearer ` prefix.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_validator_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionValidator>();
    }
}
