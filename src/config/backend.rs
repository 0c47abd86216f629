//! Backend call settings

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timeout and retry settings applied to every store and identity call
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,

    /// Extra attempts for idempotent reads
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    /// Delay before the first retry in milliseconds; doubles each attempt
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl BackendConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.call_timeout_ms == 0 {
            return Err(ValidationError::ZeroDuration("backend call timeout"));
        }
        if self.read_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout(),
            read_retries: default_read_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_call_timeout() -> u64 {
    10_000
}

fn default_read_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    200
}
