//! In-memory identity store.
//!
//! Clones share one directory, so a second provider built over a clone sees
//! the same identities.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{AuthenticatedUser, DomainError, ErrorCode, FactorId, UserId};
use crate::ports::{FactorRecord, IdentityRecord, IdentityStore, PendingSecret};

#[derive(Debug, Default)]
struct Directory {
    identities: HashMap<UserId, IdentityRecord>,
    /// Token to owner.
    verification_tokens: HashMap<String, UserId>,
    pending_secrets: HashMap<UserId, PendingSecret>,
    factors: HashMap<UserId, Vec<FactorRecord>>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityStore {
    directory: Arc<RwLock<Directory>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn insert(&self, record: &IdentityRecord) -> Result<(), DomainError> {
        let mut directory = self.directory.write().await;
        let taken = directory.identities.contains_key(&record.user.id)
            || directory
                .identities
                .values()
                .any(|existing| existing.user.email.eq_ignore_ascii_case(&record.user.email));
        if taken {
            return Err(DomainError::new(
                ErrorCode::DuplicateRecord,
                format!("An identity already exists for {}", record.user.email),
            ));
        }
        directory
            .identities
            .insert(record.user.id.clone(), record.clone());
        Ok(())
    }

    async fn find_by_uid(&self, uid: &UserId) -> Result<Option<IdentityRecord>, DomainError> {
        Ok(self.directory.read().await.identities.get(uid).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, DomainError> {
        let email = email.trim();
        Ok(self
            .directory
            .read()
            .await
            .identities
            .values()
            .find(|record| record.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn delete(&self, uid: &UserId) -> Result<(), DomainError> {
        let mut directory = self.directory.write().await;
        directory.identities.remove(uid);
        directory.verification_tokens.retain(|_, owner| owner != uid);
        directory.pending_secrets.remove(uid);
        directory.factors.remove(uid);
        Ok(())
    }

    async fn replace_verification_token(
        &self,
        uid: &UserId,
        token: &str,
    ) -> Result<(), DomainError> {
        let mut directory = self.directory.write().await;
        directory.verification_tokens.retain(|_, owner| owner != uid);
        directory
            .verification_tokens
            .insert(token.to_string(), uid.clone());
        Ok(())
    }

    async fn verification_token_for(&self, uid: &UserId) -> Result<Option<String>, DomainError> {
        Ok(self
            .directory
            .read()
            .await
            .verification_tokens
            .iter()
            .find(|(_, owner)| *owner == uid)
            .map(|(token, _)| token.clone()))
    }

    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedUser>, DomainError> {
        let mut directory = self.directory.write().await;
        let Some(uid) = directory.verification_tokens.remove(token) else {
            return Ok(None);
        };
        Ok(directory.identities.get_mut(&uid).map(|record| {
            record.user.email_verified = true;
            record.user.clone()
        }))
    }

    async fn replace_pending_secret(
        &self,
        uid: &UserId,
        pending: &PendingSecret,
    ) -> Result<(), DomainError> {
        self.directory
            .write()
            .await
            .pending_secrets
            .insert(uid.clone(), pending.clone());
        Ok(())
    }

    async fn pending_secret(&self, uid: &UserId) -> Result<Option<PendingSecret>, DomainError> {
        Ok(self.directory.read().await.pending_secrets.get(uid).cloned())
    }

    async fn enroll_factor(
        &self,
        uid: &UserId,
        secret_ref: &str,
        factor: &FactorRecord,
    ) -> Result<bool, DomainError> {
        let mut directory = self.directory.write().await;
        let still_pending = directory
            .pending_secrets
            .get(uid)
            .map_or(false, |pending| pending.secret_ref == secret_ref);
        if !still_pending {
            return Ok(false);
        }
        directory.pending_secrets.remove(uid);
        directory
            .factors
            .entry(uid.clone())
            .or_default()
            .push(factor.clone());
        Ok(true)
    }

    async fn factors(&self, uid: &UserId) -> Result<Vec<FactorRecord>, DomainError> {
        Ok(self
            .directory
            .read()
            .await
            .factors
            .get(uid)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_factor(
        &self,
        uid: &UserId,
        factor_id: &FactorId,
    ) -> Result<bool, DomainError> {
        let mut directory = self.directory.write().await;
        let Some(factors) = directory.factors.get_mut(uid) else {
            return Ok(false);
        };
        let before = factors.len();
        factors.retain(|record| &record.factor.id != factor_id);
        Ok(factors.len() < before)
    }

    async fn advance_factor_counter(
        &self,
        factor_id: &FactorId,
        counter: u64,
    ) -> Result<bool, DomainError> {
        let mut directory = self.directory.write().await;
        let record = directory
            .factors
            .values_mut()
            .flatten()
            .find(|record| &record.factor.id == factor_id);
        match record {
            Some(record) if counter > record.last_counter => {
                record.last_counter = counter;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::mfa::{MfaFactor, TotpSecret};

    fn record(uid: &str, email: &str) -> IdentityRecord {
        IdentityRecord {
            user: AuthenticatedUser::new(UserId::new(uid).unwrap(), email, None, false),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Timestamp::from_unix_secs(1_748_736_000),
        }
    }

    fn factor(last_counter: u64) -> FactorRecord {
        FactorRecord {
            factor: MfaFactor {
                id: FactorId::new(),
                display_name: "Authenticator app".to_string(),
                enrolled_at: Timestamp::from_unix_secs(1_748_736_000),
            },
            secret: TotpSecret::from_bytes(&[7u8; 20]),
            last_counter,
        }
    }

    fn pending(secret_ref: &str) -> PendingSecret {
        PendingSecret {
            secret_ref: secret_ref.to_string(),
            secret: TotpSecret::from_bytes(&[9u8; 20]),
        }
    }

    #[tokio::test]
    async fn email_is_unique_ignoring_case() {
        let store = InMemoryIdentityStore::new();
        store.insert(&record("u1", "maria@example.com")).await.unwrap();

        let err = store
            .insert(&record("u2", "MARIA@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateRecord);
        assert!(store.find_by_email(" Maria@Example.com ").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = InMemoryIdentityStore::new();
        let other = store.clone();
        store.insert(&record("u1", "maria@example.com")).await.unwrap();

        let uid = UserId::new("u1").unwrap();
        assert!(other.find_by_uid(&uid).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn token_is_consumed_once_and_verifies_owner() {
        let store = InMemoryIdentityStore::new();
        let uid = UserId::new("u1").unwrap();
        store.insert(&record("u1", "maria@example.com")).await.unwrap();
        store.replace_verification_token(&uid, "first").await.unwrap();
        store.replace_verification_token(&uid, "second").await.unwrap();

        assert!(store.consume_verification_token("first").await.unwrap().is_none());
        let user = store.consume_verification_token("second").await.unwrap().unwrap();
        assert!(user.email_verified);
        assert!(store.consume_verification_token("second").await.unwrap().is_none());
        assert!(store.find_by_uid(&uid).await.unwrap().unwrap().user.email_verified);
    }

    #[tokio::test]
    async fn enrollment_requires_the_current_pending_secret() {
        let store = InMemoryIdentityStore::new();
        let uid = UserId::new("u1").unwrap();
        store.replace_pending_secret(&uid, &pending("old")).await.unwrap();
        store.replace_pending_secret(&uid, &pending("new")).await.unwrap();

        assert!(!store.enroll_factor(&uid, "old", &factor(1)).await.unwrap());
        assert!(store.enroll_factor(&uid, "new", &factor(1)).await.unwrap());
        assert!(store.pending_secret(&uid).await.unwrap().is_none());
        assert_eq!(store.factors(&uid).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn counter_only_moves_forward() {
        let store = InMemoryIdentityStore::new();
        let uid = UserId::new("u1").unwrap();
        let enrolled = factor(100);
        store.replace_pending_secret(&uid, &pending("ref")).await.unwrap();
        store.enroll_factor(&uid, "ref", &enrolled).await.unwrap();
        let id = enrolled.factor.id;

        assert!(!store.advance_factor_counter(&id, 100).await.unwrap());
        assert!(store.advance_factor_counter(&id, 101).await.unwrap());
        assert!(!store.advance_factor_counter(&id, 101).await.unwrap());
        assert!(!store.advance_factor_counter(&FactorId::new(), 500).await.unwrap());
        assert_eq!(store.factors(&uid).await.unwrap()[0].last_counter, 101);
    }

    #[tokio::test]
    async fn delete_removes_everything_for_the_identity() {
        let store = InMemoryIdentityStore::new();
        let uid = UserId::new("u1").unwrap();
        store.insert(&record("u1", "maria@example.com")).await.unwrap();
        store.replace_verification_token(&uid, "token").await.unwrap();
        store.replace_pending_secret(&uid, &pending("ref")).await.unwrap();
        store.enroll_factor(&uid, "ref", &factor(1)).await.unwrap();

        store.delete(&uid).await.unwrap();

        assert!(store.find_by_email("maria@example.com").await.unwrap().is_none());
        assert!(store.verification_token_for(&uid).await.unwrap().is_none());
        assert!(store.factors(&uid).await.unwrap().is_empty());
        store.insert(&record("u2", "maria@example.com")).await.unwrap();
    }
}
