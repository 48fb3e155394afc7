//! Expiring key/value cache for model results.
//!
//! Results for the deterministic-enough translate/explain modes are
//! cached under a content [fingerprint](crate::fingerprint) so a
//! distinct piece of content costs at most one model call per TTL.
//! Chat replies are never cached.
//!
//! [`CacheStore`] keeps the backend opaque: the in-process
//! [`MemoryCache`] is the default, and [`NoopCache`] is the degraded
//! mode when caching is disabled — every lookup misses, every store is
//! dropped, and the service keeps working. A shared backend (e.g.
//! redis) would implement the same trait; the fingerprint keys are
//! stable across processes, so nothing else changes.
//!
//! Two concurrent misses for the same fingerprint may both call the
//! model and both store; last write wins and the values are identical
//! per input, so the race is accepted.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use crate::telemetry;
use crate::types::{LlmResult, Mode};

/// TTL applied to stored results. Entries are never invalidated
/// explicitly; they expire passively.
pub const RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Opaque expiring key/value store.
///
/// Values are serialized strings so backends need no knowledge of the
/// result types.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a value. `None` is a miss (absent or expired).
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value with a per-entry time-to-live.
    async fn put(&self, key: &str, value: String, ttl: Duration);
}

/// Configuration for the in-memory cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }
}

/// Per-entry TTL carried alongside the value.
struct TtlExpiry;

impl Expiry<String, (String, Duration)> for TtlExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(String, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-process cache backed by moka's async LRU.
pub struct MemoryCache {
    cache: Cache<String, (String, Duration)>,
}

impl MemoryCache {
    /// Create a new in-memory cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(TtlExpiry)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await.map(|(value, _)| value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        self.cache.insert(key.to_string(), (value, ttl)).await;
    }
}

/// Cache used when no store is configured: all lookups miss, all
/// stores are dropped.
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) {}
}

/// Look up a cached result. Emits cache hit/miss metrics; entries that
/// fail to deserialize (e.g. written by an older build) count as
/// misses.
pub async fn get_result(store: &dyn CacheStore, mode: Mode, key: &str) -> Option<LlmResult> {
    match store.get(key).await {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(result) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "mode" => mode.as_str())
                    .increment(1);
                Some(result)
            }
            Err(_) => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "mode" => mode.as_str())
                    .increment(1);
                None
            }
        },
        None => {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "mode" => mode.as_str()).increment(1);
            None
        }
    }
}

/// Store a result under its fingerprint with the standard TTL.
pub async fn put_result(store: &dyn CacheStore, key: &str, result: &LlmResult) {
    if let Ok(raw) = serde_json::to_string(result) {
        store.put(key, raw, RESULT_TTL).await;
    }
}
