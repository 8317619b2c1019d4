//! Request pipeline composing the cache, rate limiter and retry executor.

mod config;
mod execute;

pub use config::PipelineConfig;
pub use execute::RequestPipeline;
