//! Call policy for every port call: explicit timeout, plus bounded retry with
//! exponential backoff for idempotent reads.
//!
//! Writes get the timeout but are never retried here. A booking write that
//! timed out may still have landed; the client retries it with the same
//! idempotency key instead.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::domain::account::AccountError;
use crate::domain::foundation::{AuthError, DomainError};
use crate::domain::mfa::MfaError;

/// Errors the policy can classify and synthesize on timeout.
pub trait RetryableError: Sized {
    fn is_transient(&self) -> bool;

    fn timed_out(operation: &'static str) -> Self;
}

impl RetryableError for DomainError {
    fn is_transient(&self) -> bool {
        DomainError::is_transient(self)
    }

    fn timed_out(operation: &'static str) -> Self {
        DomainError::timeout(operation)
    }
}

impl RetryableError for AuthError {
    fn is_transient(&self) -> bool {
        AuthError::is_transient(self)
    }

    fn timed_out(operation: &'static str) -> Self {
        AuthError::service_unavailable(format!("{} timed out", operation))
    }
}

impl RetryableError for MfaError {
    fn is_transient(&self) -> bool {
        MfaError::is_transient(self)
    }

    fn timed_out(operation: &'static str) -> Self {
        MfaError::Unavailable(format!("{} timed out", operation))
    }
}

impl RetryableError for AccountError {
    fn is_transient(&self) -> bool {
        AccountError::is_transient(self)
    }

    fn timed_out(operation: &'static str) -> Self {
        AccountError::Backend(DomainError::timeout(operation))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Per-attempt limit.
    pub timeout: Duration,
    /// Extra attempts for reads after the first.
    pub read_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            read_retries: 2,
            backoff: Duration::from_millis(200),
        }
    }
}

impl CallPolicy {
    pub fn new(timeout: Duration, read_retries: u32, backoff: Duration) -> Self {
        Self {
            timeout,
            read_retries,
            backoff,
        }
    }

    /// Idempotent read: timeout per attempt, transient failures retried.
    pub async fn read<T, E, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, E>
    where
        E: RetryableError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry_count = 0;

        loop {
            let err = match timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => err,
                Err(_) => E::timed_out(operation),
            };

            if !err.is_transient() || retry_count >= self.read_retries {
                return Err(err);
            }

            // Exponential backoff: backoff, 2x, 4x, ...
            let delay = self.backoff * (1u32 << retry_count.min(16));
            tracing::warn!(
                operation,
                retry = retry_count + 1,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying"
            );
            sleep(delay).await;
            retry_count += 1;
        }
    }

    /// Non-idempotent call: timeout only.
    pub async fn write<T, E, Fut>(&self, operation: &'static str, call: Fut) -> Result<T, E>
    where
        E: RetryableError,
        Fut: Future<Output = Result<T, E>>,
    {
        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, "Call timed out");
                Err(E::timed_out(operation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(read_retries: u32) -> CallPolicy {
        CallPolicy::new(Duration::from_millis(50), read_retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn read_retries_transient_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, DomainError> = fast_policy(2)
            .read("flaky read", || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(DomainError::new(ErrorCode::ServiceUnavailable, "down"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn read_gives_up_after_bounded_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), DomainError> = fast_policy(1)
            .read("always down", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(DomainError::new(ErrorCode::ServiceUnavailable, "down")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn read_does_not_retry_permanent_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), DomainError> = fast_policy(3)
            .read("bad read", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(DomainError::new(ErrorCode::DatabaseError, "bad query")) }
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::DatabaseError);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_read_times_out_as_transient() {
        let result: Result<(), DomainError> = fast_policy(0)
            .read("slow read", || async {
                sleep(Duration::from_millis(500)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::Timeout);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn write_is_never_retried() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), MfaError> = fast_policy(5)
            .write("enroll", async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(MfaError::Unavailable("down".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_write_times_out() {
        let result: Result<(), AuthError> = fast_policy(0)
            .write("sign in", async {
                sleep(Duration::from_millis(500)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(AuthError::ServiceUnavailable(_))));
    }
}
