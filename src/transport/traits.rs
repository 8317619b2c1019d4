//! The transport seam between the pipeline and the network.
//!
//! The pipeline only depends on [`Transport`]; the production implementation
//! is [`HttpTransport`](super::HttpTransport), tests inject in-memory fakes.
//!
//! # Error contract
//!
//! Implementations must classify failures through [`GeocodeError`]:
//! network failures, timeouts, 429 and 5xx as transient variants
//! (`Http`, `Timeout`, `RateLimited`, `Api { status >= 500 }`), other
//! statuses as `Api` with a 4xx status. The retry executor relies on
//! [`GeocodeError::is_transient()`] alone.
//!
//! [`GeocodeError`]: crate::GeocodeError
//! [`GeocodeError::is_transient()`]: crate::GeocodeError::is_transient

use async_trait::async_trait;

use crate::Result;
use crate::types::{RequestDescriptor, Response};

/// Performs a single request attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logging/debugging.
    fn name(&self) -> &str;

    /// Send one request and return the response or a classified error.
    ///
    /// Called at most once per attempt; retries are the caller's concern.
    async fn send(&self, request: &RequestDescriptor) -> Result<Response>;
}

