//! Telemetry metric name constants.
//!
//! Centralised metric names for pipeline operations. Consumers install
//! their own `metrics` recorder; without a recorder installed, all metric
//! calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `nominatim_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation` — endpoint path invoked (e.g. "/reverse", "/search")
//! - `status` — outcome: "ok" or "error"

/// Total requests executed through the pipeline, cache hits included.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "nominatim_requests_total";

/// Pipeline execution duration in seconds.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "nominatim_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "nominatim_retries_total";

/// Total response cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "nominatim_cache_hits_total";

/// Total response cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "nominatim_cache_misses_total";

/// Number of times a caller had to wait for a rate-limit window to roll over.
pub const RATE_LIMIT_WAITS_TOTAL: &str = "nominatim_rate_limit_waits_total";
