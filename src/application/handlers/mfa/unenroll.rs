//! UnenrollMfaHandler - Command handler removing a second factor.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::foundation::{FactorId, UserId};
use crate::domain::mfa::{MfaError, MfaFactor};
use crate::ports::IdentityProvider;

#[derive(Debug, Clone)]
pub struct UnenrollMfaCommand {
    pub user_id: UserId,
    pub factor_id: FactorId,
}

pub struct UnenrollMfaHandler {
    identity: Arc<dyn IdentityProvider>,
    policy: CallPolicy,
}

impl UnenrollMfaHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, policy: CallPolicy) -> Self {
        Self { identity, policy }
    }

    /// Returns the factors remaining afterwards, as the provider reports them.
    pub async fn handle(&self, cmd: UnenrollMfaCommand) -> Result<Vec<MfaFactor>, MfaError> {
        self.policy
            .write(
                "unenroll_factor",
                self.identity.unenroll(&cmd.user_id, &cmd.factor_id),
            )
            .await?;

        tracing::info!(user_id = %cmd.user_id, factor_id = %cmd.factor_id, "MFA factor removed");

        self.policy
            .read("list_factors", || self.identity.list_factors(&cmd.user_id))
            .await
    }
}
