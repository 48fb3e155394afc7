//! HTTP surface: application state and router.

pub mod card;
pub mod config;
pub mod frame;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::cache::CacheStore;
use crate::limiter::RateLimiter;
use crate::providers::{CastApi, ModelApi};

/// Shared per-process state handed to every handler.
///
/// The upstream seams are trait objects so handler tests can swap in
/// mocks; everything else is plain configuration.
pub struct AppState {
    pub casts: Arc<dyn CastApi>,
    pub model: Arc<dyn ModelApi>,
    pub cache: Arc<dyn CacheStore>,
    pub limiter: RateLimiter,
    /// Public base URL embedded in frame image and post-back URLs.
    pub public_url: String,
    /// Default translation target language.
    pub target_lang: String,
}

/// Build the router for all surfaces.
///
/// The frame and image routes get permissive CORS; social clients load
/// them cross-origin.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let frame_routes = Router::new()
        .route("/frame", get(handlers::frame_entry))
        .route("/frame-assist", post(handlers::frame_assist))
        .route("/og", get(handlers::og_card))
        .route("/cover", get(handlers::cover_card))
        .layer(cors);

    Router::new()
        .route("/translate-or-explain", post(handlers::translate_or_explain))
        .route("/chat", post(handlers::chat))
        .route("/fetch-cast", post(handlers::fetch_cast))
        .merge(frame_routes)
        .with_state(state)
}
