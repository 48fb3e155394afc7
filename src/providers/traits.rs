//! Seams between the orchestration handlers and the upstream APIs.
//!
//! Handlers hold `Arc<dyn CastApi>` / `Arc<dyn ModelApi>` so the
//! upstreams can be swapped for mocks in handler-level tests, and so a
//! different model backend slots in without touching orchestration.

use async_trait::async_trait;

use crate::Result;
use crate::types::{Cast, LlmRequest, LlmResult};

/// Content-API seam: cast lookup by hash.
///
/// No retries and no caching at this layer — both, when wanted, are the
/// caller's responsibility.
#[async_trait]
pub trait CastApi: Send + Sync {
    /// Fetch a cast by its hash identifier.
    async fn fetch_by_hash(&self, hash: &str) -> Result<Cast>;
}

/// Language-model seam.
#[async_trait]
pub trait ModelApi: Send + Sync {
    /// Run one model call for the request's mode and return the parsed
    /// result. Implementations retry transient transport failures
    /// internally; a malformed reply is fatal and not retried.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResult>;
}
