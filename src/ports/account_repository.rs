//! Account repository port.
//!
//! Accounts hold the role used for post-sign-in routing. Credentials and
//! second factors stay with the identity provider.

use async_trait::async_trait;

use crate::domain::account::Account;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// # Errors
    ///
    /// - `DuplicateRecord` if the uid or email is taken
    async fn insert(&self, account: &Account) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    async fn update(&self, account: &Account) -> Result<(), DomainError>;

    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<Account>, DomainError>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;
}
