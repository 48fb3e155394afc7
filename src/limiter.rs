//! Process-local rate limiting for the interactive frame surface.
//!
//! Window-by-reset semantics: each key tracks a count and a window
//! start; once the window length has elapsed the counter resets and the
//! window restarts. The counter is incremented *before* the limit
//! check, so the request that crosses the threshold is itself rejected
//! and counted — a rejected caller that keeps retrying stays counted
//! against the same window until it resets. This ordering is part of
//! the contract.
//!
//! State lives only in process memory behind a mutex; it is neither
//! durable nor shared across instances.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::telemetry;
use crate::{Result, SkaldError};

/// Configuration for the rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per key per window. Default: 20.
    pub limit: u32,
    /// Window length. Default: 60s.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-window request limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the window length.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Per-key sliding-window counter.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Create a limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one attempt for `key`, failing if the key is over its
    /// window budget.
    pub fn consume(&self, key: &str) -> Result<()> {
        self.consume_at(key, Instant::now())
    }

    /// Clock-injectable form of [`consume`](Self::consume).
    pub fn consume_at(&self, key: &str, now: Instant) -> Result<()> {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.saturating_duration_since(window.started) > self.config.window {
            window.count = 0;
            window.started = now;
        }

        window.count += 1;
        if window.count > self.config.limit {
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
            return Err(SkaldError::RateLimitExceeded {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}
