//! In-memory response cache with per-entry TTL and LRU eviction.
//!
//! [`ResponseCache`] sits at the front of the
//! [`RequestPipeline`](crate::pipeline::RequestPipeline). A hit bypasses the
//! rate limiter, the retry executor and the transport entirely.
//!
//! # Eviction
//!
//! The store is bounded by `max_entries`. Inserting a new key into a full
//! store evicts the least-recently-used entry; lookups refresh recency but
//! never extend an entry's TTL. The recency list is strictly ordered, so
//! entries inserted back to back are evicted in insertion order.
//!
//! # Expiry
//!
//! Expired entries are evicted lazily: a lookup that finds an expired entry
//! removes it and reports a miss. Expired entries still occupy a slot until
//! they are looked up or pushed out by LRU eviction.
//!
//! # Lifetime
//!
//! The cache lives as long as the pipeline that owns it, which is one
//! process invocation. Nothing is written to disk.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;
use tracing::debug;

use crate::types::Response;

/// Configuration for the response cache.
///
/// ```rust
/// # use nominatim_cli::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(500)
///     .ttl(Duration::from_secs(60));
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether responses are cached at all. Default: true.
    pub enabled: bool,
    /// Maximum number of cached entries. Default: 100.
    pub max_entries: usize,
    /// Time-to-live applied to new entries. Zero disables storing. Default: 5 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 100,
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that turns caching off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: usize) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug)]
struct CacheEntry {
    response: Response,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Bounded LRU + TTL cache of responses keyed by request cache key.
///
/// A disabled cache is a null object: lookups always miss and inserts are
/// dropped, so callers never branch on whether caching is on.
pub struct ResponseCache {
    store: Option<Mutex<LruCache<String, CacheEntry>>>,
}

impl ResponseCache {
    /// Create a cache from configuration.
    ///
    /// A config with `enabled = false` or `max_entries = 0` yields a
    /// disabled cache.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).filter(|_| config.enabled);
        Self {
            store: capacity.map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Create a cache that never stores anything.
    pub fn disabled() -> Self {
        Self { store: None }
    }

    /// Whether this cache stores entries.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Look up an unexpired response.
    ///
    /// A hit marks the entry as most recently used. An expired entry is
    /// removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Response> {
        let mut store = self.lock()?;
        let now = Instant::now();
        match store.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => return Some(entry.response.clone()),
            Some(_) => {}
        }
        store.pop(key);
        debug!(key, "evicted expired cache entry");
        None
    }

    /// Insert or replace the response for `key`.
    ///
    /// A zero `ttl` means the response is not cacheable and nothing is
    /// stored. Inserting a new key into a full cache evicts the least
    /// recently used entry first.
    pub fn put(&self, key: impl Into<String>, response: Response, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let Some(mut store) = self.lock() else {
            return;
        };
        let key = key.into();
        let entry = CacheEntry {
            response,
            created_at: Instant::now(),
            ttl,
        };
        if let Some((evicted, _)) = store.push(key.clone(), entry)
            && evicted != key
        {
            debug!(key = %evicted, "evicted least recently used cache entry");
        }
    }

    /// Evict all entries.
    pub fn clear(&self) {
        if let Some(mut store) = self.lock() {
            store.clear();
        }
    }

    /// Number of entries currently held, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().map(|store| store.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry for `key` is stored, without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lock()
            .map(|store| store.contains(key))
            .unwrap_or(false)
    }

    fn lock(&self) -> Option<MutexGuard<'_, LruCache<String, CacheEntry>>> {
        // A panic while holding the lock cannot leave the LRU list torn,
        // so a poisoned store is still usable.
        self.store
            .as_ref()
            .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
