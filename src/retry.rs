//! Retry configuration, delay calculation, and the shared retry helper.
//!
//! Provides [`RetryConfig`] for controlling retry behaviour and the
//! [`with_retry()`] helper that re-invokes a fallible async operation
//! on transient errors, keeping retry logic in a single place.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::{Result, SkaldError};

/// Configuration for retry behaviour on transient errors.
///
/// Uses linear backoff: the wait before retry *n* (1-based) is
/// `base_delay × n`, so delays strictly increase per attempt.
///
/// ```rust
/// # use skald::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .base_delay(Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay; attempt *n* waits `base_delay × n`. Default: 1s.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// The policy used for production model calls: 5 attempts with a
    /// 3 second base delay (3s, 6s, 9s, 12s between attempts).
    pub fn model_call() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(3),
        }
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Calculate the delay after a given attempt number (0-indexed):
    /// `base_delay × (attempt + 1)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Calculate the effective delay, respecting upstream `retry_after`
    /// hints from rate-limit errors, which take precedence over the
    /// computed backoff.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Execute an async operation with retry logic.
///
/// Retries on transient errors (as classified by
/// [`SkaldError::is_transient()`]) up to `config.max_attempts`, using
/// linear backoff and respecting `retry_after` hints. Permanent errors
/// are returned immediately without retry; exhaustion propagates the
/// last error without further delay.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..config.max_attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "operation" => operation.to_owned(),
                )
                .increment(1);
                if attempt + 1 < config.max_attempts {
                    let delay = config.effective_delay(attempt, e.retry_after());
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_attempts = config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e), // permanent error, no retry
        }
    }
    Err(last_err.unwrap_or(SkaldError::EmptyResponse))
}
