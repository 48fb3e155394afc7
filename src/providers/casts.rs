//! Content-API client for cast lookups.
//!
//! Casts are fetched fresh on every request; derived results are cached
//! by [fingerprint](crate::fingerprint), never the cast itself. Retries
//! and caching, where wanted, are the caller's responsibility.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::traits::CastApi;
use crate::types::Cast;
use crate::{Result, SkaldError};

/// Default base URL for the content API
const DEFAULT_BASE_URL: &str = "https://api.neynar.com/v2";

/// The content API wraps the cast in an envelope object.
#[derive(Deserialize)]
struct CastEnvelope {
    cast: Cast,
}

/// Client for the cast content API.
#[derive(Clone)]
pub struct CastClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl CastClient {
    /// Create a new content client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch a cast by its hash identifier.
    ///
    /// Any non-2xx status is a fatal [`SkaldError::CastFetch`] carrying
    /// the upstream status and reason.
    pub async fn fetch_by_hash(&self, hash: &str) -> Result<Cast> {
        let url = format!(
            "{}/farcaster/cast?identifier={}&type=hash",
            self.base_url, hash
        );

        let response = self
            .http
            .get(&url)
            .header("api_key", &self.api_key)
            .send()
            .await
            .map_err(|e| SkaldError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkaldError::CastFetch {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("cast lookup failed")
                    .to_string(),
            });
        }

        let envelope: CastEnvelope = response
            .json()
            .await
            .map_err(|e| SkaldError::Http(e.to_string()))?;

        Ok(envelope.cast)
    }
}

#[async_trait]
impl CastApi for CastClient {
    async fn fetch_by_hash(&self, hash: &str) -> Result<Cast> {
        // Delegate to the existing method
        CastClient::fetch_by_hash(self, hash).await
    }
}
