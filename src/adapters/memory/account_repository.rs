//! In-memory account store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::account::Account;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::AccountRepository;

#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<UserId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &Account) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let taken = accounts.contains_key(&account.uid)
            || accounts
                .values()
                .any(|a| a.email.eq_ignore_ascii_case(&account.email));
        if taken {
            return Err(DomainError::new(
                ErrorCode::DuplicateRecord,
                format!("An account already exists for {}", account.email),
            ));
        }
        accounts.insert(account.uid.clone(), account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.uid) {
            Some(stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", account.uid),
            )),
        }
    }

    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.read().await.get(uid).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let email = email.trim();
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}
