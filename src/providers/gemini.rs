//! Generative-language API client.
//!
//! One [`generate`](GeminiClient::generate) call composes a
//! mode-specific system instruction, a JSON-encoded text part, and up
//! to three inlined images, invokes the model through the retry
//! wrapper, and parses the normalized reply into the mode's
//! [`LlmResult`] variant.
//!
//! Image fetching happens before the retry loop and is all-or-nothing:
//! a single failed fetch aborts the whole call. Caching, where wanted,
//! is the caller's responsibility.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::future::try_join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompts;
use super::traits::ModelApi;
use crate::extract::extract_json_object;
use crate::retry::{RetryConfig, with_retry};
use crate::types::{LlmRequest, LlmResult, TurnRole};
use crate::{Result, SkaldError};

/// Default base URL for the generative-language API
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// At most this many image URLs are fetched and inlined per call.
const MAX_INLINE_IMAGES: usize = 3;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// `generateContent` request structure
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

/// Content structure: an optional role plus ordered parts
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

/// Part of content (text or inlined binary data)
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 payload with its MIME type
#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// The JSON text part sent as the user message.
#[derive(Serialize)]
struct TextPayload<'a> {
    text: &'a str,
    target_lang: &'a str,
    mode: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the generative-language API.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl GeminiClient {
    /// Create a new client with the given API key and the production
    /// retry policy ([`RetryConfig::model_call`]).
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
            model: DEFAULT_MODEL.to_string(),
            retry: RetryConfig::model_call(),
        }
    }

    /// Override the model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run one model call and parse the reply for the request's mode.
    ///
    /// The model invocation goes through the retry wrapper; image
    /// fetching and reply parsing do not. A reply that fails to parse
    /// after normalization is fatal and never retried.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResult> {
        let image_parts = self.inline_images(&request.image_urls).await?;
        let payload = self.build_request(request, image_parts)?;

        let raw = with_retry(&self.retry, "generate", || self.invoke(&payload)).await?;

        let cleaned = extract_json_object(&raw);
        LlmResult::from_reply(request.mode, &cleaned)
    }

    /// Fetch the first [`MAX_INLINE_IMAGES`] URLs concurrently as one
    /// batch. Any single failure aborts the batch.
    async fn inline_images(&self, image_urls: &[String]) -> Result<Vec<Part>> {
        let fetches = image_urls
            .iter()
            .take(MAX_INLINE_IMAGES)
            .map(|url| self.fetch_inline_image(url));
        try_join_all(fetches).await
    }

    async fn fetch_inline_image(&self, url: &str) -> Result<Part> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SkaldError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkaldError::Api {
                status: status.as_u16(),
                message: format!("image fetch failed: {url}"),
            });
        }

        let mime_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SkaldError::Http(e.to_string()))?;

        Ok(Part::InlineData {
            inline_data: InlineData {
                mime_type,
                data: BASE64.encode(&bytes),
            },
        })
    }

    /// Compose the request: history turns (chat mode), then one user
    /// content holding the JSON text part and the image parts.
    fn build_request(
        &self,
        request: &LlmRequest,
        image_parts: Vec<Part>,
    ) -> Result<GenerateContentRequest> {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| Content {
                role: Some(convert_role(turn.role).to_string()),
                parts: vec![Part::Text {
                    text: turn.content.clone(),
                }],
            })
            .collect();

        let text_payload = serde_json::to_string(&TextPayload {
            text: &request.text,
            target_lang: &request.target_lang,
            mode: request.mode.as_str(),
        })?;

        let mut parts = vec![Part::Text { text: text_payload }];
        parts.extend(image_parts);
        contents.push(Content {
            role: Some("user".to_string()),
            parts,
        });

        Ok(GenerateContentRequest {
            contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: prompts::system_instruction(request.mode).to_string(),
                }],
            },
        })
    }

    /// One `generateContent` invocation, without retries.
    async fn invoke(&self, payload: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SkaldError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_api_error(&response));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SkaldError::Http(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(SkaldError::Api {
                status: error.code,
                message: error.message,
            });
        }

        Self::extract_text(parsed)
    }

    /// Map a non-2xx response to the appropriate error.
    fn map_api_error(response: &reqwest::Response) -> SkaldError {
        let status = response.status().as_u16();
        match status {
            401 | 403 => SkaldError::AuthenticationFailed,
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                SkaldError::RateLimited { retry_after }
            }
            code => SkaldError::Api {
                status: code,
                message: format!("generative-language API error: {code}"),
            },
        }
    }

    /// The raw reply text: first part of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let part = response
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|mut c| {
                if c.parts.is_empty() {
                    None
                } else {
                    Some(c.parts.remove(0))
                }
            });

        match part {
            Some(Part::Text { text }) if !text.trim().is_empty() => Ok(text),
            // An empty reply is transient; the model occasionally
            // returns a candidate with no usable part under load.
            _ => Err(SkaldError::EmptyResponse),
        }
    }
}

/// Convert a caller-supplied turn role to the API's role format.
const fn convert_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Assistant => "model",
    }
}

#[async_trait]
impl ModelApi for GeminiClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResult> {
        // Delegate to the existing method
        GeminiClient::generate(self, request).await
    }
}
