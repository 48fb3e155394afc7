//! Orchestration handlers for the JSON, chat, and frame surfaces.
//!
//! Handlers validate input at the boundary, then run the shared
//! sequence: gather content → fingerprint → cache lookup → model call
//! on miss → cache store → shape the response. The JSON surfaces map
//! failures to status codes with a generic message; the frame surface
//! never returns a non-200 — every failure renders as a "Try again"
//! frame.

use std::sync::{Arc, LazyLock};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fingerprint::{build_quote_text, fingerprint};
use crate::server::AppState;
use crate::server::card::{CardPayload, render_cover_card, render_result_card};
use crate::server::frame::{Frame, FrameButton, FramePostBody};
use crate::types::{Assets, ChatTurn, LlmRequest, LlmResult, Mode};
use crate::{Result, cache, telemetry};

/// A cast hash is valid iff it is `0x` followed by exactly 40 hex chars.
static CAST_HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid pattern"));

/// Generic error body for the JSON surfaces. Internal details are
/// logged, never returned.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn reject(status: StatusCode, message: &'static str) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

fn count_request(surface: &'static str, ok: bool) {
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "surface" => surface,
        "status" => if ok { "ok" } else { "error" },
    )
    .increment(1);
}

// ============================================================================
// Shared orchestration
// ============================================================================

/// Fingerprint → cache lookup → model call on miss → cache store.
///
/// Used by the translate/explain surfaces only; chat replies are never
/// cached. Two concurrent misses for the same fingerprint may both call
/// the model; last write wins.
async fn cached_generate(
    state: &AppState,
    mode: Mode,
    target_lang: &str,
    text: &str,
    image_urls: &[String],
) -> Result<LlmResult> {
    let key = fingerprint(mode, target_lang, text, image_urls);

    if let Some(hit) = cache::get_result(state.cache.as_ref(), mode, &key).await {
        debug!(mode = mode.as_str(), "serving cached result");
        return Ok(hit);
    }

    let request =
        LlmRequest::new(mode, text, target_lang).with_images(image_urls.to_vec());
    let result = state.model.generate(&request).await?;
    cache::put_result(state.cache.as_ref(), &key, &result).await;
    Ok(result)
}

// ============================================================================
// POST /translate-or-explain
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub mode: Mode,
    #[serde(default)]
    pub target_lang: Option<String>,
}

pub async fn translate_or_explain(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TranslateRequest>,
) -> Response {
    let text = body.text.trim();
    if text.is_empty() {
        count_request("translate", false);
        return reject(StatusCode::BAD_REQUEST, "Text is required");
    }
    if body.mode == Mode::Chat {
        count_request("translate", false);
        return reject(StatusCode::BAD_REQUEST, "Unsupported mode");
    }
    let target_lang = body
        .target_lang
        .as_deref()
        .unwrap_or(&state.target_lang)
        .to_string();

    match cached_generate(&state, body.mode, &target_lang, text, &[]).await {
        Ok(result) => {
            count_request("translate", true);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            warn!(mode = body.mode.as_str(), error = %e, "translate request failed");
            count_request("translate", false);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Translation failed. Please try again.",
            )
        }
    }
}

// ============================================================================
// POST /chat
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub cast_hash: String,
    pub input: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    content: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Response {
    let hash = body.cast_hash.trim();
    if !CAST_HASH_PATTERN.is_match(hash) {
        count_request("chat", false);
        return reject(StatusCode::BAD_REQUEST, "Invalid castHash");
    }
    let input = body.input.trim();
    if input.is_empty() {
        count_request("chat", false);
        return reject(StatusCode::BAD_REQUEST, "Input text is required");
    }

    let cast = match state.casts.fetch_by_hash(hash).await {
        Ok(cast) => cast,
        Err(e) => {
            warn!(error = %e, "cast fetch failed");
            count_request("chat", false);
            return reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch cast data",
            );
        }
    };
    let assets = Assets::from_cast(&cast);

    let request = LlmRequest::new(Mode::Chat, input, state.target_lang.clone())
        .with_images(assets.image_urls)
        .with_history(body.history);

    match state.model.generate(&request).await {
        Ok(LlmResult::Chat(reply)) => {
            count_request("chat", true);
            (
                StatusCode::OK,
                Json(ChatResponse {
                    content: reply.content,
                }),
            )
                .into_response()
        }
        Ok(other) => {
            warn!(result = ?other, "chat call returned a non-chat result");
            count_request("chat", false);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Chat failed. Please try again.",
            )
        }
        Err(e) => {
            warn!(error = %e, "chat request failed");
            count_request("chat", false);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Chat failed. Please try again.",
            )
        }
    }
}

// ============================================================================
// POST /fetch-cast
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchCastRequest {
    pub cast_hash: String,
}

/// The derived view of a cast handed to display surfaces.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchCastResponse {
    text: String,
    image_urls: Vec<String>,
    other_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_hash: Option<String>,
}

pub async fn fetch_cast(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FetchCastRequest>,
) -> Response {
    let hash = body.cast_hash.trim();
    if !CAST_HASH_PATTERN.is_match(hash) {
        count_request("fetch_cast", false);
        return reject(StatusCode::BAD_REQUEST, "Invalid castHash");
    }

    match state.casts.fetch_by_hash(hash).await {
        Ok(cast) => {
            let assets = Assets::from_cast(&cast);
            count_request("fetch_cast", true);
            (
                StatusCode::OK,
                Json(FetchCastResponse {
                    text: assets.text,
                    image_urls: assets.image_urls,
                    other_urls: assets.other_urls,
                    parent_hash: cast.parent_hash,
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "cast fetch failed");
            count_request("fetch_cast", false);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch cast data",
            )
        }
    }
}

// ============================================================================
// Frame surface
// ============================================================================

fn html_response(html: String) -> Response {
    ([(header::CACHE_CONTROL, "max-age=60")], Html(html)).into_response()
}

fn translate_button_label(state: &AppState) -> String {
    format!("Translate to {}", state.target_lang.to_uppercase())
}

/// The entry frame and the prompt-for-input frame are the same card:
/// cover image, mode buttons, input placeholder.
fn prompt_frame(state: &AppState) -> Frame {
    Frame {
        image: format!("{}/cover", state.public_url),
        post_url: Some(format!("{}/frame-assist", state.public_url)),
        buttons: vec![
            FrameButton::post(translate_button_label(state)),
            FrameButton::post("Explain (ELI5)"),
        ],
        input: Some("Ask a question…".to_string()),
    }
}

fn error_frame(state: &AppState) -> Frame {
    Frame {
        image: format!("{}/cover", state.public_url),
        post_url: Some(format!("{}/frame-assist", state.public_url)),
        buttons: vec![FrameButton::post("Try again")],
        input: None,
    }
}

fn result_frame(state: &AppState, result: &LlmResult) -> Frame {
    let payload = serde_json::to_string(result).unwrap_or_default();
    let quote = build_quote_text(result);
    let composer = format!(
        "https://warpcast.com/~/compose?text={}",
        urlencoding::encode(&quote)
    );
    Frame {
        image: format!(
            "{}/og?payload={}",
            state.public_url,
            urlencoding::encode(&payload)
        ),
        post_url: Some(format!("{}/frame-assist", state.public_url)),
        buttons: vec![
            FrameButton::post_redirect("Quote result", composer),
            FrameButton::post("Show original"),
        ],
        input: None,
    }
}

/// `GET /frame` — the static entry frame.
pub async fn frame_entry(State(state): State<Arc<AppState>>) -> Response {
    html_response(prompt_frame(&state).render())
}

/// `POST /frame-assist` — the interactive frame protocol.
///
/// Always returns 200 with a renderable frame; a malformed body or any
/// processing failure renders the error frame instead of an HTTP error.
pub async fn frame_assist(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let html = match serde_json::from_slice::<FramePostBody>(&body) {
        Ok(frame_body) => match assist(&state, &frame_body).await {
            Ok(html) => {
                count_request("frame", true);
                html
            }
            Err(e) => {
                warn!(error = %e, "frame assist failed");
                count_request("frame", false);
                error_frame(&state).render()
            }
        },
        Err(e) => {
            warn!(error = %e, "malformed frame body");
            count_request("frame", false);
            error_frame(&state).render()
        }
    };
    html_response(html)
}

/// One frame transition: rate-limit, gather content, then the shared
/// fingerprint → cache → model path.
async fn assist(state: &AppState, body: &FramePostBody) -> Result<String> {
    let data = &body.untrusted_data;
    let mode = if data.button_index == Some(2) {
        Mode::Explain
    } else {
        Mode::Translate
    };

    // Consumed before any upstream call; the tripping request is
    // itself counted and rejected.
    state
        .limiter
        .consume(&format!("{}:{}", data.fid, mode.as_str()))?;

    // Content priority: input text, then the referenced cast, then its
    // parent. Fetch failures degrade to the next step.
    let mut text = data
        .input_text
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string();
    let mut image_urls: Vec<String> = Vec::new();

    if text.is_empty() {
        if let Some(cast_id) = &data.cast_id {
            match state.casts.fetch_by_hash(&cast_id.hash).await {
                Ok(cast) => {
                    let assets = Assets::from_cast(&cast);
                    text = assets.text;
                    image_urls = assets.image_urls;

                    if text.is_empty() {
                        if let Some(parent_hash) = &cast.parent_hash {
                            match state.casts.fetch_by_hash(parent_hash).await {
                                Ok(parent) => {
                                    let parent_assets = Assets::from_cast(&parent);
                                    text = parent_assets.text;
                                    if image_urls.is_empty() {
                                        image_urls = parent_assets.image_urls;
                                    }
                                }
                                Err(e) => warn!(error = %e, "parent cast fetch failed"),
                            }
                        }
                    }
                }
                Err(e) => warn!(error = %e, "cast fetch failed"),
            }
        }
    }

    if text.is_empty() && image_urls.is_empty() {
        return Ok(prompt_frame(state).render());
    }

    let result = cached_generate(state, mode, &state.target_lang, &text, &image_urls).await?;
    Ok(result_frame(state, &result).render())
}

// ============================================================================
// Image endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OgParams {
    #[serde(default)]
    pub payload: Option<String>,
}

fn svg_response(svg: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "max-age=60"),
        ],
        svg,
    )
        .into_response()
}

/// `GET /og?payload=<json>` — the dynamic result card. A payload that
/// fails to parse falls back to the cover card.
pub async fn og_card(Query(params): Query<OgParams>) -> Response {
    let raw = params.payload.unwrap_or_default();
    let svg = match serde_json::from_str::<CardPayload>(&raw) {
        Ok(payload) => render_result_card(&payload),
        Err(_) => render_cover_card(),
    };
    svg_response(svg)
}

/// `GET /cover` — the static cover card.
pub async fn cover_card() -> Response {
    svg_response(render_cover_card())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_hash_pattern_matches_contract() {
        assert!(CAST_HASH_PATTERN.is_match(&format!("0x{}", "a1".repeat(20))));
        assert!(!CAST_HASH_PATTERN.is_match("0xabc"));
        assert!(!CAST_HASH_PATTERN.is_match(&"a1".repeat(21)));
        assert!(!CAST_HASH_PATTERN.is_match(&format!("0x{}", "g1".repeat(20))));
        assert!(!CAST_HASH_PATTERN.is_match(&format!("0x{}x", "a1".repeat(20))));
    }
}
