//! ResendVerificationHandler - Command handler re-sending the verification email.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::ports::IdentityProvider;

use super::AuthFlowError;

#[derive(Debug, Clone)]
pub struct ResendVerificationCommand {
    pub email: String,
}

pub struct ResendVerificationHandler {
    identity: Arc<dyn IdentityProvider>,
    policy: CallPolicy,
}

impl ResendVerificationHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, policy: CallPolicy) -> Self {
        Self { identity, policy }
    }

    pub async fn handle(&self, cmd: ResendVerificationCommand) -> Result<(), AuthFlowError> {
        self.policy
            .write(
                "send_email_verification",
                self.identity.send_email_verification(&cmd.email),
            )
            .await?;
        tracing::debug!("Verification email re-sent");
        Ok(())
    }
}
