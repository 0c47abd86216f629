//! Application configuration module
//!
//! Configuration is read from environment variables with the `GYMSCHED`
//! prefix; nested values use `__` as the separator. A `.env` file is loaded
//! first when present.
//!
//! # Example
//!
//! ```no_run
//! use gymsched::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod backend;
mod database;
mod error;
mod server;

pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_LEN};
pub use backend::BackendConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; in-memory stores when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Sessions, TOTP, staff roles
    pub auth: AuthConfig,

    /// Timeouts and retries for backend calls
    #[serde(default)]
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `GYMSCHED__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GYMSCHED__AUTH__SESSION_SECRET=...` -> `auth.session_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GYMSCHED")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.auth.validate(&self.server.environment)?;
        self.backend.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "GYMSCHED__AUTH__SESSION_SECRET",
        "GYMSCHED__AUTH__ADMIN_EMAIL",
        "GYMSCHED__DATABASE__URL",
        "GYMSCHED__SERVER__PORT",
        "GYMSCHED__SERVER__ENVIRONMENT",
        "GYMSCHED__SERVER__CORS_ORIGINS",
        "GYMSCHED__BACKEND__READ_RETRIES",
    ];

    fn set_minimal_env() {
        env::set_var("GYMSCHED__AUTH__SESSION_SECRET", "test-secret");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GYMSCHED__AUTH__ADMIN_EMAIL", "admin@gymsched.test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.auth.admin_email.as_deref(),
            Some("admin@gymsched.test")
        );
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_section_is_optional() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GYMSCHED__DATABASE__URL", "postgresql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.url, "postgresql://test@localhost/test");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn test_server_and_backend_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.backend.read_retries, 2);
    }

    #[test]
    fn test_production_requires_long_secret() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GYMSCHED__SERVER__ENVIRONMENT", "production");
        env::set_var("GYMSCHED__SERVER__CORS_ORIGINS", "https://gymsched.test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::SessionSecretTooShort(MIN_PRODUCTION_SECRET_LEN))
        );
    }

    #[test]
    fn test_custom_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("GYMSCHED__SERVER__PORT", "3000");
        env::set_var("GYMSCHED__BACKEND__READ_RETRIES", "4");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.read_retries, 4);
    }

    #[test]
    fn test_missing_auth_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
