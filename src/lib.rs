//! Skald - translation and explanation gateway for Farcaster casts
//!
//! This crate fetches a cast by hash from a content API, forwards its
//! text and attached images to a generative-language API, and returns a
//! structured translation, explanation, or chat reply. Results for the
//! translate/explain modes are cached under a content fingerprint; a
//! server-rendered Frame surface exposes the same functionality inside
//! a social client.
//!
//! # Example
//!
//! ```rust,no_run
//! use skald::providers::{GeminiClient, ModelApi};
//! use skald::types::{LlmRequest, Mode};
//!
//! #[tokio::main]
//! async fn main() -> skald::Result<()> {
//!     let client = GeminiClient::new("your-api-key");
//!
//!     let request = LlmRequest::new(Mode::Translate, "gm farcaster", "vi");
//!     let result = client.generate(&request).await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! The `skaldd` binary wires the clients, cache, and rate limiter
//! behind an HTTP router; see [`server`].

pub mod cache;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod limiter;
pub mod providers;
pub mod retry;
pub mod server;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheStore, MemoryCache, NoopCache};
pub use error::{Result, SkaldError};
pub use extract::extract_json_object;
pub use fingerprint::{build_quote_text, fingerprint};
pub use limiter::{RateLimitConfig, RateLimiter};
pub use retry::{RetryConfig, with_retry};

// Re-export all types
pub use types::{
    Assets, Cast, ChatReply, ChatTurn, Embed, Explanation, GlossaryEntry, LlmRequest, LlmResult,
    Mode, Translation, TurnRole,
};
