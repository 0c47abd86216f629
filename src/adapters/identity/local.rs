//! In-process identity provider.
//!
//! Credentials are Argon2id hashes, sessions are HS256 JWTs signed with the
//! configured secret, and second factors are TOTP secrets checked by a
//! [`TotpGenerator`]. Records live in an [`IdentityStore`]; only open sign-in
//! challenges are held in process. Verification tokens are written to the log
//! rather than mailed.
//!
//! Each factor remembers the last time step it accepted, so a code is spent
//! once used, including the code that completed enrollment.
//!
//! Token expiry is checked against the injected [`Clock`] so tests can pin
//! time; `jsonwebtoken` only verifies the signature and issuer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::adapters::crypto::generate_secret;
use crate::domain::foundation::{
    AuthError, AuthenticatedUser, ChallengeId, FactorId, Timestamp, UserId,
};
use crate::domain::mfa::{
    MfaChallenge, MfaError, MfaFactor, MfaSecret, ProvisioningUri, TotpCode, TotpConfig,
};
use crate::ports::{
    Clock, FactorRecord, IdentityProvider, IdentityRecord, IdentityStore, PasswordHasher,
    PendingSecret, Registration, Session, SessionValidator, SignInOutcome, TotpGenerator,
};

const TOKEN_ISSUER: &str = "gymsched";
const MIN_PASSWORD_LEN: usize = 8;
const FACTOR_DISPLAY_NAME: &str = "Authenticator app";

/// Settings for the local provider.
#[derive(Debug, Clone)]
pub struct LocalIdentityConfig {
    /// HS256 signing key for session tokens.
    pub session_secret: SecretString,
    pub session_ttl_secs: u64,
    /// Issuer label shown in authenticator apps.
    pub totp_issuer: String,
    pub totp: TotpConfig,
    pub challenge_ttl_secs: u64,
    /// Refuse sign-in until the email is confirmed.
    pub require_verified_email: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    iss: String,
    iat: u64,
    exp: u64,
}

pub struct LocalIdentityProvider {
    config: LocalIdentityConfig,
    hasher: Arc<dyn PasswordHasher>,
    totp: Arc<dyn TotpGenerator>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn IdentityStore>,
    challenges: RwLock<HashMap<ChallengeId, MfaChallenge>>,
}

impl LocalIdentityProvider {
    pub fn new(
        config: LocalIdentityConfig,
        store: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
        totp: Arc<dyn TotpGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            hasher,
            totp,
            clock,
            store,
            challenges: RwLock::new(HashMap::new()),
        }
    }

    /// Unconsumed verification token for `email`. The log is the only other
    /// place it appears.
    pub async fn pending_verification_token(&self, email: &str) -> Option<String> {
        let record = self.store.find_by_email(&normalize_email(email)).await.ok()??;
        self.store
            .verification_token_for(&record.user.id)
            .await
            .ok()
            .flatten()
    }

    /// Checks `code` against each factor and spends the matched time step.
    /// A step at or below the factor's last accepted one is a replay.
    async fn spend_code(
        &self,
        factors: &[FactorRecord],
        code: &TotpCode,
        now: Timestamp,
    ) -> Result<bool, MfaError> {
        for record in factors {
            let Some(step) = self.totp.verify_at(&record.secret, code, now.as_unix_secs()) else {
                continue;
            };
            if step <= record.last_counter {
                tracing::warn!(factor_id = %record.factor.id, "Spent second-factor code replayed");
                continue;
            }
            if self
                .store
                .advance_factor_counter(&record.factor.id, step)
                .await?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn issue_session(&self, user: &AuthenticatedUser) -> Result<Session, AuthError> {
        let now = self.clock.now();
        let expires_at = now.plus_secs(self.config.session_ttl_secs);
        let claims = SessionClaims {
            sub: user.id.as_str().to_string(),
            email: user.email.clone(),
            name: user.display_name.clone(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.as_unix_secs(),
            exp: expires_at.as_unix_secs(),
        };
        let key = EncodingKey::from_secret(self.config.session_secret.expose_secret().as_bytes());
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            AuthError::service_unavailable("could not issue session")
        })?;

        Ok(Session {
            user: user.clone(),
            access_token,
            expires_at,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is compared against the injected clock below.
        validation.validate_exp = false;

        let key = DecodingKey::from_secret(self.config.session_secret.expose_secret().as_bytes());
        let data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in session token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!("Session token rejected: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;

        if data.claims.exp <= self.clock.now().as_unix_secs() {
            tracing::debug!("Session token expired");
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for LocalIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentityProvider")
            .field("totp_issuer", &self.config.totp_issuer)
            .field("require_verified_email", &self.config.require_verified_email)
            .finish_non_exhaustive()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn register(&self, registration: &Registration) -> Result<AuthenticatedUser, AuthError> {
        let email = normalize_email(&registration.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidInput("a valid email is required".into()));
        }
        if registration.password.expose_secret().len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let password_hash = self.hasher.hash(registration.password.expose_secret())?;

        let uid = UserId::new(Uuid::new_v4().to_string())
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let display_name = Some(registration.display_name.trim().to_string())
            .filter(|name| !name.is_empty());
        let user = AuthenticatedUser::new(uid, email, display_name, false);

        self.store
            .insert(&IdentityRecord {
                user: user.clone(),
                password_hash,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Identity registered");
        Ok(user)
    }

    async fn delete_registration(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.store.delete(user_id).await?;
        tracing::info!(user_id = %user_id, "Identity registration rolled back");
        Ok(())
    }

    async fn send_email_verification(&self, email: &str) -> Result<(), AuthError> {
        let record = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let uid = record.user.id;
        if record.user.email_verified {
            tracing::debug!(user_id = %uid, "Email already verified, nothing to send");
            return Ok(());
        }

        // One live token per user.
        let token = Uuid::new_v4().simple().to_string();
        self.store.replace_verification_token(&uid, &token).await?;

        tracing::info!(user_id = %uid, token = %token, "Email verification issued");
        Ok(())
    }

    async fn confirm_email(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let user = self
            .store
            .consume_verification_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        tracing::info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignInOutcome, AuthError> {
        let record = self
            .store
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .hasher
            .verify(password.expose_secret(), &record.password_hash)?
        {
            tracing::info!(user_id = %record.user.id, "Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        if self.config.require_verified_email && !record.user.email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let enrolled = !self.store.factors(&record.user.id).await?.is_empty();
        if enrolled {
            let challenge = MfaChallenge::issue(
                record.user.id.clone(),
                self.clock.now(),
                self.config.challenge_ttl_secs,
            );
            self.challenges
                .write()
                .await
                .insert(challenge.id, challenge.clone());
            tracing::info!(user_id = %record.user.id, challenge_id = %challenge.id, "Second factor required");
            return Ok(SignInOutcome::ChallengeRequired(challenge));
        }

        tracing::info!(user_id = %record.user.id, "Signed in");
        Ok(SignInOutcome::Authenticated(self.issue_session(&record.user)?))
    }

    async fn resolve_mfa_challenge(
        &self,
        challenge_id: &ChallengeId,
        code: &TotpCode,
    ) -> Result<Session, MfaError> {
        let now = self.clock.now();
        let mut challenges = self.challenges.write().await;

        let challenge = challenges
            .get(challenge_id)
            .cloned()
            .ok_or(MfaError::ChallengeNotFound)?;
        if let Err(err) = challenge.ensure_open(now) {
            challenges.remove(challenge_id);
            return Err(err);
        }

        let factors = self.store.factors(&challenge.user_id).await?;
        if factors.is_empty() {
            return Err(MfaError::NotEnrolled);
        }

        if !self.spend_code(&factors, code, now).await? {
            let err = match challenges.get_mut(challenge_id) {
                Some(open) => open.record_failure(),
                None => MfaError::ChallengeNotFound,
            };
            if err == MfaError::TooManyAttempts {
                challenges.remove(challenge_id);
            }
            tracing::info!(challenge_id = %challenge_id, "Second-factor code rejected");
            return Err(err);
        }

        challenges.remove(challenge_id);
        drop(challenges);
        let user = self
            .store
            .find_by_uid(&challenge.user_id)
            .await?
            .map(|record| record.user)
            .ok_or(MfaError::ChallengeNotFound)?;

        tracing::info!(user_id = %user.id, "Second factor accepted");
        self.issue_session(&user)
            .map_err(|e| MfaError::Unavailable(e.to_string()))
    }

    async fn generate_mfa_secret(&self, user: &AuthenticatedUser) -> Result<MfaSecret, MfaError> {
        let secret = generate_secret();
        let provisioning_uri = ProvisioningUri::new(
            &self.config.totp_issuer,
            &user.email,
            &secret,
            &self.config.totp,
        )
        .map_err(|e| MfaError::Provider(e.to_string()))?;
        let secret_ref = Uuid::new_v4().to_string();

        // Replaces any earlier pending secret, which stops verifying.
        self.store
            .replace_pending_secret(
                &user.id,
                &PendingSecret {
                    secret_ref: secret_ref.clone(),
                    secret: secret.clone(),
                },
            )
            .await?;

        tracing::info!(user_id = %user.id, "TOTP secret issued");
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
        let now = self.clock.now();
        let pending = self
            .store
            .pending_secret(user_id)
            .await?
            .filter(|pending| pending.secret_ref == secret_ref)
            .ok_or(MfaError::UnknownSecret)?;

        let Some(step) = self.totp.verify_at(&pending.secret, code, now.as_unix_secs()) else {
            tracing::info!(user_id = %user_id, "Enrollment code rejected");
            return Err(MfaError::InvalidOrExpiredCode);
        };

        let factor = MfaFactor {
            id: FactorId::new(),
            display_name: FACTOR_DISPLAY_NAME.to_string(),
            enrolled_at: now,
        };
        let record = FactorRecord {
            factor: factor.clone(),
            secret: pending.secret,
            last_counter: step,
        };
        if !self.store.enroll_factor(user_id, secret_ref, &record).await? {
            return Err(MfaError::UnknownSecret);
        }

        tracing::info!(user_id = %user_id, factor_id = %factor.id, "TOTP factor enrolled");
        Ok(factor)
    }

    async fn unenroll(&self, user_id: &UserId, factor_id: &FactorId) -> Result<(), MfaError> {
        if !self.store.remove_factor(user_id, factor_id).await? {
            return Err(MfaError::NotEnrolled);
        }

        tracing::info!(user_id = %user_id, factor_id = %factor_id, "TOTP factor removed");
        Ok(())
    }

    async fn list_factors(&self, user_id: &UserId) -> Result<Vec<MfaFactor>, MfaError> {
        Ok(self
            .store
            .factors(user_id)
            .await?
            .into_iter()
            .map(|record| record.factor)
            .collect())
    }
}

#[async_trait]
impl SessionValidator for LocalIdentityProvider {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode_claims(token)?;
        let uid = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;

        // Current record, so verification status is never stale.
        self.store
            .find_by_uid(&uid)
            .await?
            .map(|record| record.user)
            .ok_or(AuthError::InvalidToken)
    }
}
