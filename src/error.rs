//! Skald error types

use std::time::Duration;

/// Skald error types
#[derive(Debug, thiserror::Error)]
pub enum SkaldError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by upstream, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    /// Content API returned a non-2xx status for a cast lookup.
    #[error("cast fetch failed ({status}): {message}")]
    CastFetch { status: u16, message: String },

    // Model output errors
    #[error("model reply contains no JSON object")]
    NoJsonPayload,

    #[error("model reply is not valid JSON: {0}")]
    MalformedReply(String),

    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Local policy errors
    #[error("rate limit exceeded for {key}")]
    RateLimitExceeded { key: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SkaldError {
    /// Whether a retry has any chance of succeeding.
    ///
    /// Upstream overload, gateway failures, and rate limiting are
    /// transient; validation, auth, and malformed model output are not.
    /// The message heuristic on [`SkaldError::Http`] covers providers
    /// that report overload only in free text.
    pub fn is_transient(&self) -> bool {
        match self {
            SkaldError::RateLimited { .. } | SkaldError::EmptyResponse => true,
            SkaldError::Api { status, message } => {
                matches!(status, 429 | 500 | 502 | 503 | 504) || message.contains("overloaded")
            }
            SkaldError::Http(msg) => {
                msg.contains("overloaded")
                    || msg.contains("503")
                    || msg.contains("502")
                    || msg.contains("429")
                    || msg.contains("timeout")
                    || msg.contains("timed out")
                    || msg.contains("connection reset")
                    || msg.contains("connection refused")
            }
            _ => false,
        }
    }

    /// Upstream-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SkaldError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for Skald operations
pub type Result<T> = std::result::Result<T, SkaldError>;
