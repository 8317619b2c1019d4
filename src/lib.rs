//! nominatim-cli - command-line client for Nominatim-compatible geocoding services
//!
//! Every API call goes through a [`RequestPipeline`]: a bounded LRU + TTL
//! response cache, a fixed-window rate limiter and a retrying executor with
//! exponential backoff, wrapped around an injected [`Transport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nominatim_cli::{
//!     CommonOptions, HttpTransport, PipelineConfig, RequestPipeline, ReverseQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() -> nominatim_cli::Result<()> {
//!     let transport = HttpTransport::new(
//!         "https://nominatim.openstreetmap.org",
//!         "my-app/1.0 (ops@example.org)",
//!     )?;
//!     let pipeline = RequestPipeline::new(PipelineConfig::default(), Arc::new(transport))?;
//!
//!     let request = ReverseQuery::parse("48.8584", "2.2945")?
//!         .to_descriptor(&CommonOptions::default())?;
//!     let response = pipeline.execute(&request).await?;
//!
//!     println!("{}", response.body);
//!     Ok(())
//! }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;
pub mod transport;
pub mod types;
mod version;

pub use cache::{CacheConfig, ResponseCache};
pub use error::{GeocodeError, Result};
pub use pipeline::{PipelineConfig, RequestPipeline};
pub use transport::{
    HttpTransport, RateLimitConfig, RateLimiter, RetryConfig, RetryExecutor, Transport,
};
pub use types::{
    CommonOptions, LookupQuery, OutputFormat, RequestDescriptor, Response, ReverseQuery,
    SearchQuery, StatusQuery, StructuredQuery,
};
pub use version::{PKG_VERSION, default_user_agent, version_string};
