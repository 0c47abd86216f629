//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum session secret length outside development.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Session, second-factor, and staff-role settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 key for session tokens
    pub session_secret: SecretString,

    /// Session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Lifetime of a pending sign-in challenge in seconds
    #[serde(default = "default_challenge_ttl")]
    pub challenge_ttl_secs: u64,

    /// Issuer label in authenticator apps
    #[serde(default = "default_totp_issuer")]
    pub totp_issuer: String,

    /// Refuse sign-in until the email is confirmed
    #[serde(default = "default_require_verified_email")]
    pub require_verified_email: bool,

    /// Account email that resolves to the admin role
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Account email that resolves to the owner role
    #[serde(default)]
    pub owner_email: Option<String>,

    /// Argon2 memory cost in KiB
    #[serde(default = "default_password_memory_kib")]
    pub password_memory_kib: u32,

    /// Argon2 iterations
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,

    /// Argon2 lanes
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn challenge_ttl(&self) -> Duration {
        Duration::from_secs(self.challenge_ttl_secs)
    }

    /// Validate authentication configuration
    ///
    /// Production requires a secret of at least
    /// [`MIN_PRODUCTION_SECRET_LEN`] bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret_len = self.session_secret.expose_secret().len();
        if secret_len == 0 {
            return Err(ValidationError::MissingRequired("AUTH__SESSION_SECRET"));
        }
        if *environment == Environment::Production && secret_len < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::SessionSecretTooShort(
                MIN_PRODUCTION_SECRET_LEN,
            ));
        }
        if self.session_ttl_secs == 0 {
            return Err(ValidationError::ZeroDuration("session ttl"));
        }
        if self.challenge_ttl_secs == 0 {
            return Err(ValidationError::ZeroDuration("challenge ttl"));
        }
        if self.totp_issuer.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__TOTP_ISSUER"));
        }
        for email in [&self.admin_email, &self.owner_email].into_iter().flatten() {
            if !email.contains('@') {
                return Err(ValidationError::InvalidStaffEmail(email.clone()));
            }
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: SecretString::new(String::new()),
            session_ttl_secs: default_session_ttl(),
            challenge_ttl_secs: default_challenge_ttl(),
            totp_issuer: default_totp_issuer(),
            require_verified_email: default_require_verified_email(),
            admin_email: None,
            owner_email: None,
            password_memory_kib: default_password_memory_kib(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
        }
    }
}

fn default_session_ttl() -> u64 {
    8 * 3600
}

fn default_challenge_ttl() -> u64 {
    300
}

fn default_totp_issuer() -> String {
    "GymSchedPro".to_string()
}

fn default_require_verified_email() -> bool {
    true
}

fn default_password_memory_kib() -> u32 {
    19 * 1024
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}
