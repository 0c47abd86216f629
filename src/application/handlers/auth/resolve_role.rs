//! ResolveRoleHandler - Query handler mapping an identity to its role.

use std::sync::Arc;

use crate::application::CallPolicy;
use crate::domain::account::{AccountError, Role};
use crate::domain::foundation::UserId;
use crate::ports::AccountRepository;

#[derive(Debug, Clone)]
pub struct ResolveRoleQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveRoleResult {
    pub role: Role,
    /// Where the client lands after authenticating.
    pub home_path: &'static str,
}

impl From<Role> for ResolveRoleResult {
    fn from(role: Role) -> Self {
        Self {
            role,
            home_path: role.home_path(),
        }
    }
}

/// Reads the role from the account record.
///
/// A missing record is an error. It is never treated as a client.
pub struct ResolveRoleHandler {
    accounts: Arc<dyn AccountRepository>,
    policy: CallPolicy,
}

impl ResolveRoleHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, policy: CallPolicy) -> Self {
        Self { accounts, policy }
    }

    pub async fn handle(&self, query: ResolveRoleQuery) -> Result<ResolveRoleResult, AccountError> {
        let account = self
            .policy
            .read("find_account", || self.accounts.find_by_uid(&query.user_id))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %query.user_id, "Authenticated identity has no account");
                AccountError::NotFound(query.user_id.clone())
            })?;

        Ok(account.role.into())
    }
}
