//! ConfirmEmailHandler - Command handler consuming a verification token.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::{Account, AccountError};
use crate::ports::{AccountRepository, IdentityProvider};

use super::AuthFlowError;

#[derive(Debug, Clone)]
pub struct ConfirmEmailCommand {
    pub token: String,
}

/// Marks the identity and the account profile verified.
pub struct ConfirmEmailHandler {
    identity: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountRepository>,
    policy: CallPolicy,
}

impl ConfirmEmailHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        accounts: Arc<dyn AccountRepository>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            identity,
            accounts,
            policy,
        }
    }

    pub async fn handle(&self, cmd: ConfirmEmailCommand) -> Result<Account, AuthFlowError> {
        let user = self
            .policy
            .write("confirm_email", self.identity.confirm_email(&cmd.token))
            .await?;

        let mut account = self
            .policy
            .read("find_account", || self.accounts.find_by_uid(&user.id))
            .await?
            .ok_or_else(|| AccountError::NotFound(user.id.clone()))?;

        if !account.email_verified {
            account.mark_verified();
            self.policy
                .write("update_account", self.accounts.update(&account))
                .await?;
        }

        tracing::info!(user_id = %account.uid, "Email confirmed");
        Ok(account)
    }
}
