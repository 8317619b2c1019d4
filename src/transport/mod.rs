//! Transport seam and the resilience primitives wrapped around it.
//!
//! - [`traits::Transport`] performs one request attempt.
//! - [`http::HttpTransport`] is the reqwest-backed implementation.
//! - [`retry::RetryExecutor`] re-attempts transient failures with backoff.
//! - [`rate_limit::RateLimiter`] bounds the outgoing request rate.

pub mod http;
pub mod rate_limit;
pub mod retry;
pub mod traits;

pub use http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpTransport};
pub use rate_limit::{RateLimitConfig, RateLimitSnapshot, RateLimiter};
pub use retry::{RetryConfig, RetryExecutor};
pub use traits::Transport;
