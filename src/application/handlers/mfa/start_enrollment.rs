//! StartMfaEnrollmentHandler - Command handler issuing a TOTP secret.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::foundation::AuthenticatedUser;
use crate::domain::mfa::{MfaError, MfaSecret};
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct StartMfaEnrollmentCommand {
    pub user: AuthenticatedUser,
}

/// Issues a new secret. Any earlier pending secret for the user stops
/// verifying.
pub struct StartMfaEnrollmentHandler {
    identity: Arc<dyn IdentityProvider>,
    policy: CallPolicy,
}

impl StartMfaEnrollmentHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, policy: CallPolicy) -> Self {
        Self { identity, policy }
    }

    pub async fn handle(&self, cmd: StartMfaEnrollmentCommand) -> Result<MfaSecret, MfaError> {
        let secret = self
            .policy
            .write(
                "generate_mfa_secret",
                self.identity.generate_mfa_secret(&cmd.user),
            )
            .await?;
        tracing::info!(user_id = %cmd.user.id, "MFA enrollment started");
        Ok(secret)
    }
}
