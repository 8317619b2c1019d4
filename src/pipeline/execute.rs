//! The request pipeline: cache, then rate limiter, then retrying transport.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument};

use super::config::PipelineConfig;
use crate::Result;
use crate::cache::ResponseCache;
use crate::telemetry;
use crate::transport::{RateLimiter, RetryExecutor, Transport};
use crate::types::{RequestDescriptor, Response};

/// Single entry point between command handlers and the transport.
///
/// Every request flows through the same three stages:
///
/// ```text
///  execute(descriptor)
///        │
///        ▼
///  ┌─────────────┐  hit
///  │ResponseCache│ ─────► return cached response
///  └─────┬───────┘
///        │ miss
///        ▼
///  ┌─────────────┐
///  │ RateLimiter │ ──► may suspend until the window rolls over
///  └─────┬───────┘
///        ▼
///  ┌─────────────┐
///  │RetryExecutor│ ──► transport.send() up to max_attempts times
///  └─────┬───────┘
///        │ ok                         err
///        ▼                             ▼
///  cache.put + return          propagate unchanged
/// ```
///
/// A cache hit consumes no permit and makes no attempt. All methods take
/// `&self`; one pipeline can serve many concurrent tasks.
pub struct RequestPipeline {
    cache: ResponseCache,
    rate_limiter: RateLimiter,
    retry: RetryExecutor,
    transport: Arc<dyn Transport>,
    config: PipelineConfig,
}

impl RequestPipeline {
    /// Build a pipeline around `transport`.
    ///
    /// Returns [`GeocodeError::Configuration`](crate::GeocodeError::Configuration)
    /// when `config` fails [`PipelineConfig::validate()`].
    pub fn new(config: PipelineConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            cache: ResponseCache::new(&config.cache),
            rate_limiter: RateLimiter::new(&config.rate_limit),
            retry: RetryExecutor::new(config.retry.clone()),
            transport,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn ttl(&self) -> Duration {
        self.config.cache.ttl
    }

    /// Execute one request through cache, rate limiter and retry.
    ///
    /// Errors from the transport are returned exactly as the final attempt
    /// produced them, and failures are never cached.
    #[instrument(skip_all, fields(transport = self.transport.name(), path = descriptor.path()))]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let start = Instant::now();
        let result = self.execute_inner(descriptor).await;
        Self::record_request(descriptor.path(), start, result.is_ok());
        result
    }

    async fn execute_inner(&self, descriptor: &RequestDescriptor) -> Result<Response> {
        let operation = descriptor.path().to_owned();
        let key = descriptor.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation).increment(1);
            debug!("cache hit");
            return Ok(cached);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation.clone())
            .increment(1);

        self.rate_limiter.acquire().await;

        let response = self
            .retry
            .run(&operation, || self.transport.send(descriptor))
            .await?;

        self.cache.put(key, response.clone(), self.ttl());
        Ok(response)
    }

    /// Record request outcome metrics (counter + histogram).
    fn record_request(operation: &str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "operation" => operation.to_owned(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "operation" => operation.to_owned(),
        )
        .record(start.elapsed().as_secs_f64());
    }
}
