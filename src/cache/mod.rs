//! Caching subsystem.
//!
//! [`ResponseCache`] holds successful responses keyed by
//! [`RequestDescriptor::cache_key()`](crate::RequestDescriptor::cache_key)
//! for the lifetime of one pipeline. See the [`response`] module docs for the
//! eviction and expiry rules.

pub mod response;

pub use response::{CacheConfig, ResponseCache};
