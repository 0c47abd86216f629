//! RegisterHandler - Command handler for creating a client account.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::CallPolicy;
use crate::domain::account::{Account, AccountError, RoleAssignment};
use crate::domain::foundation::{AuthenticatedUser, UserId};
use crate::ports::{AccountRepository, Clock, IdentityProvider, Registration};

use super::AuthFlowError;

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: SecretString,
    pub display_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub account: Account,
    /// False when the account was created but the verification message
    /// could not be sent; the client can ask for it again.
    pub verification_sent: bool,
}

/// Creates the identity, stores the profile with its role, and sends the
/// verification email.
///
/// If the profile cannot be stored the identity is deleted again, so the
/// email stays free for another attempt.
pub struct RegisterHandler {
    identity: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
    roles: RoleAssignment,
    policy: CallPolicy,
}

impl RegisterHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        accounts: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
        roles: RoleAssignment,
        policy: CallPolicy,
    ) -> Self {
        Self {
            identity,
            accounts,
            clock,
            roles,
            policy,
        }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<RegisterResult, AuthFlowError> {
        let existing = self
            .policy
            .read("find_account_by_email", || self.accounts.find_by_email(&cmd.email))
            .await?;
        if existing.is_some() {
            return Err(AccountError::AlreadyExists(cmd.email.trim().to_string()).into());
        }

        let registration = Registration {
            email: cmd.email.clone(),
            password: cmd.password,
            display_name: cmd.display_name.clone(),
        };
        let user = self
            .policy
            .write("register_identity", self.identity.register(&registration))
            .await?;

        let account = match self.store_account(&user, cmd.display_name, cmd.phone).await {
            Ok(account) => account,
            Err(err) => {
                self.roll_back_identity(&user.id).await;
                return Err(err);
            }
        };

        tracing::info!(user_id = %account.uid, role = %account.role, "Account registered");

        let verification_sent = match self
            .policy
            .write(
                "send_email_verification",
                self.identity.send_email_verification(&user.email),
            )
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(user_id = %account.uid, error = %err, "Verification email not sent");
                false
            }
        };

        Ok(RegisterResult {
            account,
            verification_sent,
        })
    }

    async fn store_account(
        &self,
        user: &AuthenticatedUser,
        display_name: String,
        phone: Option<String>,
    ) -> Result<Account, AuthFlowError> {
        let role = self.roles.role_for(&user.email);
        let account = Account::register(
            user.id.clone(),
            user.email.clone(),
            display_name,
            phone,
            role,
            self.clock.now(),
        )?;
        self.policy
            .write("insert_account", self.accounts.insert(&account))
            .await?;
        Ok(account)
    }

    async fn roll_back_identity(&self, user_id: &UserId) {
        match self
            .policy
            .write("delete_identity", self.identity.delete_registration(user_id))
            .await
        {
            Ok(()) => tracing::warn!(user_id = %user_id, "Account not stored, identity removed"),
            Err(err) => tracing::error!(
                user_id = %user_id,
                error = %err,
                "Account not stored and identity could not be removed"
            ),
        }
    }
}
