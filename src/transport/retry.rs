//! Retry configuration, delay calculation and the retry executor.
//!
//! [`RetryExecutor`] wraps a single request attempt with bounded,
//! exponentially backing-off re-attempts. Only transient errors (as
//! classified by [`GeocodeError::is_transient()`]) are retried; terminal
//! errors and the last attempt's error are returned verbatim.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::telemetry;
use crate::{GeocodeError, Result};

/// How often and how patiently a failed request is re-attempted.
///
/// The delay before retry `n` (zero-based) is `initial_delay * 2^n`, with
/// no jitter and no cap.
///
/// ```rust
/// # use nominatim_cli::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(4)
///     .initial_delay(Duration::from_millis(200));
/// assert_eq!(config.delay_for_attempt(2), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Off means exactly one attempt. Default: on.
    pub enabled: bool,
    /// Attempts per request, the first one included. Default: 3.
    pub max_attempts: u32,
    /// Wait before the second attempt. Default: 500ms.
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single attempt, no backoff.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Number of attempts actually permitted, honouring `enabled`.
    pub fn effective_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Backoff before retry number `retry` (0 = the first retry).
    ///
    /// Saturates at the largest representable delay.
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.initial_delay.saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Runs an attempt function under a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `f`, re-running it on transient errors.
    ///
    /// Calls `f` up to [`RetryConfig::effective_attempts()`] times. Between
    /// attempts the task sleeps for the backoff delay; dropping the returned
    /// future cancels the sleep. `operation` labels logs and metrics.
    pub async fn run<F, Fut, T>(&self, operation: &str, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.effective_attempts();
        let mut retry = 0;
        loop {
            let err: GeocodeError = match f().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };
            let attempt = retry + 1;
            if !err.is_transient() || attempt >= max_attempts {
                return Err(err);
            }

            let delay = self.config.delay_for_attempt(retry);
            metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => operation.to_owned())
                .increment(1);
            warn!(
                operation,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying after transient error"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
