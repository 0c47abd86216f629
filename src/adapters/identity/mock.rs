//! Mock identity adapters for testing.
//!
//! `MockSessionValidator` maps fixed tokens to users. `MockIdentityProvider`
//! implements the full identity contract over in-memory maps with a single
//! accepted TOTP code, and counts provider calls so tests can assert what
//! never reached it.
//!
//! # Example
//!
//! ```ignore
//! use gymsched::adapters::identity::MockIdentityProvider;
//!
//! let provider = MockIdentityProvider::new()
//!     .with_account("maria@example.com", "secret-pw", "uid-maria")
//!     .with_enrolled_factor("uid-maria");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{
    AuthError, AuthenticatedUser, ChallengeId, FactorId, Timestamp, UserId,
};
use crate::domain::mfa::{
    MfaChallenge, MfaError, MfaFactor, MfaSecret, ProvisioningUri, TotpCode, TotpConfig,
    TotpSecret, CHALLENGE_TTL_SECS,
};
use crate::ports::{IdentityProvider, Registration, Session, SessionValidator, SignInOutcome};

/// Code the mock accepts for enrollment and challenges.
pub const MOCK_VALID_CODE: &str = "123456";

const MOCK_SECRET: &str = "JBSWY3DPEHPK3PXP";

/// Mock session validator for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens.write().unwrap().insert(token.into(), user);
        self
    }

    /// Adds a valid token for a verified user `{user_id}@test.example.com`.
    pub fn with_test_user(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let user = AuthenticatedUser::new(
            UserId::new(&user_id).unwrap(),
            format!("{}@test.example.com", user_id),
            Some(format!("Test User {}", user_id)),
            true,
        );
        self.with_user(token, user)
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self.force_error.write().unwrap() = None;
    }

    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens.write().unwrap().insert(token.into(), user);
    }

    pub fn remove_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }

    pub fn token_count(&self) -> usize {
        self.tokens.read().unwrap().len()
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[derive(Debug, Clone)]
struct MockAccount {
    password: String,
    user: AuthenticatedUser,
}

/// Mock identity provider for testing.
///
/// Sessions are issued as `session-{uid}`. Secrets are issued as
/// `secret-{n}`; only the latest one per user is accepted.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    accounts: RwLock<HashMap<String, MockAccount>>,
    factors: RwLock<HashMap<UserId, Vec<MfaFactor>>>,
    pending_secrets: RwLock<HashMap<UserId, String>>,
    challenges: RwLock<HashMap<ChallengeId, MfaChallenge>>,
    verification_tokens: RwLock<HashMap<String, String>>,
    force_auth_error: RwLock<Option<AuthError>>,
    force_mfa_error: RwLock<Option<MfaError>>,
    secrets_issued: AtomicUsize,
    code_checks: AtomicUsize,
    verification_emails: AtomicUsize,
    deleted_registrations: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a verified account.
    pub fn with_account(
        self,
        email: impl Into<String>,
        password: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let user = AuthenticatedUser::new(UserId::new(uid).unwrap(), email.clone(), None, true);
        self.accounts.write().unwrap().insert(
            email.to_lowercase(),
            MockAccount {
                password: password.into(),
                user,
            },
        );
        self
    }

    /// Gives the user one enrolled TOTP factor, so sign-in needs a code.
    pub fn with_enrolled_factor(self, uid: impl Into<String>) -> Self {
        let uid = UserId::new(uid).unwrap();
        self.factors.write().unwrap().entry(uid).or_default().push(MfaFactor {
            id: FactorId::new(),
            display_name: "Authenticator app".to_string(),
            enrolled_at: Timestamp::now(),
        });
        self
    }

    /// Forces identity calls (register, sign-in, email) to fail.
    pub fn with_auth_error(self, error: AuthError) -> Self {
        *self.force_auth_error.write().unwrap() = Some(error);
        self
    }

    /// Forces MFA calls to fail.
    pub fn with_mfa_error(self, error: MfaError) -> Self {
        *self.force_mfa_error.write().unwrap() = Some(error);
        self
    }

    /// Makes MFA calls fail from now on.
    pub fn fail_mfa(&self, error: MfaError) {
        *self.force_mfa_error.write().unwrap() = Some(error);
    }

    pub fn clear_errors(&self) {
        *self.force_auth_error.write().unwrap() = None;
        *self.force_mfa_error.write().unwrap() = None;
    }

    /// Number of times a code was sent to the provider for checking.
    pub fn code_checks(&self) -> usize {
        self.code_checks.load(Ordering::SeqCst)
    }

    pub fn secrets_issued(&self) -> usize {
        self.secrets_issued.load(Ordering::SeqCst)
    }

    pub fn verification_emails(&self) -> usize {
        self.verification_emails.load(Ordering::SeqCst)
    }

    /// Registrations rolled back through `delete_registration`.
    pub fn deleted_registrations(&self) -> usize {
        self.deleted_registrations.load(Ordering::SeqCst)
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.read().unwrap().contains_key(&email.to_lowercase())
    }

    /// Token most recently issued for `email`, if unconsumed.
    pub fn verification_token_for(&self, email: &str) -> Option<String> {
        let email = email.to_lowercase();
        self.verification_tokens
            .read()
            .unwrap()
            .iter()
            .find(|(_, owner)| **owner == email)
            .map(|(token, _)| token.clone())
    }

    fn auth_error(&self) -> Result<(), AuthError> {
        match self.force_auth_error.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn mfa_error(&self) -> Result<(), MfaError> {
        match self.force_mfa_error.read().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn session_for(user: AuthenticatedUser) -> Session {
        Session {
            access_token: format!("session-{}", user.id),
            expires_at: Timestamp::now().plus_secs(3600),
            user,
        }
    }

    fn user_by_id(&self, uid: &UserId) -> Option<AuthenticatedUser> {
        self.accounts
            .read()
            .unwrap()
            .values()
            .find(|account| &account.user.id == uid)
            .map(|account| account.user.clone())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn register(&self, registration: &Registration) -> Result<AuthenticatedUser, AuthError> {
        self.auth_error()?;
        let key = registration.email.to_lowercase();
        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(&key) {
            return Err(AuthError::AccountExists);
        }
        let issued = accounts.len() + self.deleted_registrations.load(Ordering::SeqCst);
        let user = AuthenticatedUser::new(
            UserId::new(format!("uid-{}", issued + 1)).unwrap(),
            registration.email.clone(),
            Some(registration.display_name.clone()),
            false,
        );
        accounts.insert(
            key,
            MockAccount {
                password: registration.password.expose_secret().to_string(),
                user: user.clone(),
            },
        );
        Ok(user)
    }

    async fn delete_registration(&self, user_id: &UserId) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write().unwrap();
        let before = accounts.len();
        accounts.retain(|_, account| &account.user.id != user_id);
        if accounts.len() < before {
            self.deleted_registrations.fetch_add(1, Ordering::SeqCst);
        }
        self.factors.write().unwrap().remove(user_id);
        Ok(())
    }

    async fn send_email_verification(&self, email: &str) -> Result<(), AuthError> {
        self.auth_error()?;
        let key = email.to_lowercase();
        if !self.accounts.read().unwrap().contains_key(&key) {
            return Err(AuthError::UserNotFound);
        }
        let n = self.verification_emails.fetch_add(1, Ordering::SeqCst);
        let mut tokens = self.verification_tokens.write().unwrap();
        tokens.retain(|_, owner| *owner != key);
        tokens.insert(format!("verify-{}", n + 1), key);
        Ok(())
    }

    async fn confirm_email(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.auth_error()?;
        let email = self
            .verification_tokens
            .write()
            .unwrap()
            .remove(token)
            .ok_or(AuthError::InvalidToken)?;
        let mut accounts = self.accounts.write().unwrap();
        let account = accounts.get_mut(&email).ok_or(AuthError::UserNotFound)?;
        account.user.email_verified = true;
        Ok(account.user.clone())
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignInOutcome, AuthError> {
        self.auth_error()?;
        let account = self
            .accounts
            .read()
            .unwrap()
            .get(&email.to_lowercase())
            .cloned()
            .filter(|account| account.password == *password.expose_secret())
            .ok_or(AuthError::InvalidCredentials)?;

        let enrolled = self
            .factors
            .read()
            .unwrap()
            .get(&account.user.id)
            .map_or(false, |factors| !factors.is_empty());

        if enrolled {
            let challenge =
                MfaChallenge::issue(account.user.id.clone(), Timestamp::now(), CHALLENGE_TTL_SECS);
            self.challenges
                .write()
                .unwrap()
                .insert(challenge.id, challenge.clone());
            Ok(SignInOutcome::ChallengeRequired(challenge))
        } else {
            Ok(SignInOutcome::Authenticated(Self::session_for(account.user)))
        }
    }

    async fn resolve_mfa_challenge(
        &self,
        challenge_id: &ChallengeId,
        code: &TotpCode,
    ) -> Result<Session, MfaError> {
        self.mfa_error()?;
        self.code_checks.fetch_add(1, Ordering::SeqCst);

        let mut challenges = self.challenges.write().unwrap();
        let challenge = challenges
            .get_mut(challenge_id)
            .ok_or(MfaError::ChallengeNotFound)?;
        challenge.ensure_open(Timestamp::now())?;

        if code.as_str() != MOCK_VALID_CODE {
            return Err(challenge.record_failure());
        }

        let uid = challenge.user_id.clone();
        challenges.remove(challenge_id);
        drop(challenges);
        let user = self.user_by_id(&uid).ok_or(MfaError::ChallengeNotFound)?;
        Ok(Self::session_for(user))
    }

    async fn generate_mfa_secret(&self, user: &AuthenticatedUser) -> Result<MfaSecret, MfaError> {
        self.mfa_error()?;
        let n = self.secrets_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let secret_ref = format!("secret-{}", n);
        let secret = TotpSecret::parse(MOCK_SECRET).map_err(|e| MfaError::Provider(e.to_string()))?;
        let provisioning_uri =
            ProvisioningUri::new("GymSchedPro", &user.email, &secret, &TotpConfig::default())
                .map_err(|e| MfaError::Provider(e.to_string()))?;

        self.pending_secrets
            .write()
            .unwrap()
            .insert(user.id.clone(), secret_ref.clone());

        Ok(MfaSecret {
            secret_ref,
            secret,
            provisioning_uri,
        })
    }

    async fn verify_and_enroll(
        &self,
        user_id: &UserId,
        secret_ref: &str,
        code: &TotpCode,
    ) -> Result<MfaFactor, MfaError> {
        self.mfa_error()?;
        self.code_checks.fetch_add(1, Ordering::SeqCst);

        let mut pending = self.pending_secrets.write().unwrap();
        if pending.get(user_id).map(String::as_str) != Some(secret_ref) {
            return Err(MfaError::UnknownSecret);
        }
        if code.as_str() != MOCK_VALID_CODE {
            return Err(MfaError::InvalidOrExpiredCode);
        }
        pending.remove(user_id);

        let factor = MfaFactor {
            id: FactorId::new(),
            display_name: "Authenticator app".to_string(),
            enrolled_at: Timestamp::now(),
        };
        self.factors
            .write()
            .unwrap()
            .entry(user_id.clone())
            .or_default()
            .push(factor.clone());
        Ok(factor)
    }

    async fn unenroll(&self, user_id: &UserId, factor_id: &FactorId) -> Result<(), MfaError> {
        self.mfa_error()?;
        let mut factors = self.factors.write().unwrap();
        let list = factors.get_mut(user_id).ok_or(MfaError::NotEnrolled)?;
        let before = list.len();
        list.retain(|factor| &factor.id != factor_id);
        if list.len() == before {
            return Err(MfaError::NotEnrolled);
        }
        Ok(())
    }

    async fn list_factors(&self, user_id: &UserId) -> Result<Vec<MfaFactor>, MfaError> {
        self.mfa_error()?;
        Ok(self
            .factors
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Accepts the `session-{uid}` tokens this provider issues.
#[async_trait]
impl SessionValidator for MockIdentityProvider {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.auth_error()?;
        let uid = token
            .strip_prefix("session-")
            .and_then(|uid| UserId::new(uid).ok())
            .ok_or(AuthError::InvalidToken)?;
        self.user_by_id(&uid).ok_or(AuthError::InvalidToken)
    }
}
