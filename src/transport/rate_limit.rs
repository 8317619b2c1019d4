//! Fixed-window request rate limiter.
//!
//! At most `limit` permits are granted per window of length `interval`. The
//! window starts at the first acquisition after the previous one elapsed,
//! and the counter resets when it rolls over. A burst of up to `limit`
//! requests is possible right after a reset.
//!
//! Waiting callers sleep until the window boundary and then re-check, so
//! grants are first-come but not strictly FIFO. Waiting only suspends the
//! calling task, and dropping the `acquire` future abandons the wait.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::telemetry;

/// Configuration for the request rate limiter.
///
/// ```rust
/// # use nominatim_cli::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .limit(10)
///     .interval(Duration::from_secs(60));
/// assert_eq!(config.limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Whether requests are throttled at all. Default: true.
    pub enabled: bool,
    /// Permits per window. Default: 1.
    pub limit: u32,
    /// Window length. Default: 1 second.
    pub interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // The public Nominatim instance allows one request per second.
        Self {
            enabled: true,
            limit: 1,
            interval: Duration::from_secs(1),
        }
    }
}

impl RateLimitConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that turns throttling off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the number of permits per window.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the window length.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Whether an enabled limiter with this config can ever grant a permit.
    pub fn is_satisfiable(&self) -> bool {
        !self.enabled || (self.limit > 0 && !self.interval.is_zero())
    }
}

#[derive(Debug)]
struct Window {
    start: Instant,
    used: u32,
}

/// Point-in-time view of the limiter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: u32,
    /// Permits consumed in the current window.
    pub used: u32,
    /// Time until the next permit frees up, if the window is exhausted.
    pub estimated_wait: Option<Duration>,
}

/// Fixed-window rate limiter shared by all requests of one pipeline.
pub struct RateLimiter {
    limit: u32,
    interval: Duration,
    window: Option<Mutex<Window>>,
}

impl RateLimiter {
    /// Create a limiter from configuration.
    ///
    /// A disabled config, or one that could never grant a permit, yields a
    /// pass-through limiter; the pipeline rejects the latter before it gets
    /// here.
    pub fn new(config: &RateLimitConfig) -> Self {
        if !config.enabled || !config.is_satisfiable() {
            return Self::disabled();
        }
        Self {
            limit: config.limit,
            interval: config.interval,
            window: Some(Mutex::new(Window {
                start: Instant::now(),
                used: 0,
            })),
        }
    }

    /// Create a limiter that grants every request immediately.
    pub fn disabled() -> Self {
        Self {
            limit: 0,
            interval: Duration::ZERO,
            window: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.window.is_some()
    }

    /// Roll the window over if it has elapsed.
    fn refresh(&self, window: &mut Window, now: Instant) {
        if now.saturating_duration_since(window.start) >= self.interval {
            window.start = now;
            window.used = 0;
        }
    }

    /// Acquire one permit, sleeping until the window rolls over if needed.
    pub async fn acquire(&self) {
        let Some(window) = &self.window else {
            return;
        };

        loop {
            let wait = {
                let mut w = window.lock().await;
                let now = Instant::now();
                self.refresh(&mut w, now);

                if w.used < self.limit {
                    w.used += 1;
                    debug!(used = w.used, limit = self.limit, "rate limit permit granted");
                    return;
                }

                (w.start + self.interval).saturating_duration_since(now)
            };

            metrics::counter!(telemetry::RATE_LIMIT_WAITS_TOTAL).increment(1);
            debug!(
                wait_ms = wait.as_millis() as u64,
                "rate limit window exhausted, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Try to take a permit without waiting. Returns true if one was granted.
    pub async fn try_acquire(&self) -> bool {
        let Some(window) = &self.window else {
            return true;
        };

        let mut w = window.lock().await;
        self.refresh(&mut w, Instant::now());
        if w.used < self.limit {
            w.used += 1;
            true
        } else {
            false
        }
    }

    pub async fn snapshot(&self) -> RateLimitSnapshot {
        let Some(window) = &self.window else {
            return RateLimitSnapshot {
                limit: 0,
                used: 0,
                estimated_wait: None,
            };
        };

        let mut w = window.lock().await;
        let now = Instant::now();
        self.refresh(&mut w, now);
        let estimated_wait = (w.used >= self.limit)
            .then(|| (w.start + self.interval).saturating_duration_since(now));
        RateLimitSnapshot {
            limit: self.limit,
            used: w.used,
            estimated_wait,
        }
    }
}
