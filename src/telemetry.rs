//! Telemetry metric name constants.
//!
//! Centralised metric names for skald operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `skald_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `surface` — inbound endpoint ("translate", "chat", "fetch_cast", "frame")
//! - `operation` — upstream call ("generate", "fetch_cast")
//! - `mode` — model mode ("translate", "explain", "chat")

/// Total requests handled, by surface and outcome.
///
/// Labels: `surface`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "skald_requests_total";

/// Total retry attempts against the model API (not counting the
/// initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "skald_retries_total";

/// Total result-cache hits.
///
/// Labels: `mode`.
pub const CACHE_HITS_TOTAL: &str = "skald_cache_hits_total";

/// Total result-cache misses.
///
/// Labels: `mode`.
pub const CACHE_MISSES_TOTAL: &str = "skald_cache_misses_total";

/// Total requests rejected by the frame rate limiter.
pub const RATE_LIMITED_TOTAL: &str = "skald_rate_limited_total";
