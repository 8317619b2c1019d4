//! Aggregate configuration for a [`RequestPipeline`](super::RequestPipeline).

use crate::cache::CacheConfig;
use crate::transport::{RateLimitConfig, RetryConfig};
use crate::{GeocodeError, Result};

/// Tunables for the cache, rate limiter and retry executor.
///
/// Built once per invocation from the configuration file and command-line
/// flags, then handed to the pipeline, which owns it from then on.
///
/// ```rust
/// # use nominatim_cli::{CacheConfig, PipelineConfig, RetryConfig};
/// let config = PipelineConfig::new()
///     .cache(CacheConfig::disabled())
///     .retry(RetryConfig::new().max_attempts(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryConfig,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything off: no cache, no throttling, a single attempt.
    pub fn passthrough() -> Self {
        Self {
            cache: CacheConfig::disabled(),
            rate_limit: RateLimitConfig::disabled(),
            retry: RetryConfig::disabled(),
        }
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Reject settings that would make an enabled component useless or stuck.
    pub fn validate(&self) -> Result<()> {
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(GeocodeError::Configuration(
                "cache.max_entries must be at least 1 when caching is enabled".into(),
            ));
        }
        if !self.rate_limit.is_satisfiable() {
            return Err(GeocodeError::Configuration(
                "rate_limit.limit and rate_limit.interval must be non-zero when rate limiting is enabled"
                    .into(),
            ));
        }
        if self.retry.enabled && self.retry.max_attempts == 0 {
            return Err(GeocodeError::Configuration(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
