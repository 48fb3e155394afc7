//! Wiremock integration tests for CastClient.
//!
//! These tests verify correct HTTP interaction and error handling using mocked responses.

use skald::SkaldError;
use skald::providers::CastClient;
use skald::types::Assets;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HASH: &str = "0xabcdef0123456789abcdef0123456789abcdef01";

/// Test successful cast lookup with mixed embed shapes.
#[tokio::test]
async fn test_fetch_by_hash_success() {
    let mock_server = MockServer::start().await;

    let cast_response = serde_json::json!({
        "cast": {
            "text": "gm farcaster",
            "embeds": [
                {"url": "https://i.example/pic.png"},
                "https://example.com/article"
            ],
            "parent_hash": null
        }
    });

    Mock::given(method("GET"))
        .and(path("/farcaster/cast"))
        .and(query_param("identifier", HASH))
        .and(query_param("type", "hash"))
        .and(header("api_key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cast_response))
        .mount(&mock_server)
        .await;

    let client = CastClient::with_base_url("test_key", mock_server.uri());
    let cast = client.fetch_by_hash(HASH).await.expect("fetch should succeed");

    assert_eq!(cast.text, "gm farcaster");
    assert!(cast.parent_hash.is_none());

    let assets = Assets::from_cast(&cast);
    assert_eq!(assets.image_urls, vec!["https://i.example/pic.png"]);
    assert_eq!(assets.other_urls, vec!["https://example.com/article"]);
}

/// Test that the camelCase parent reference is picked up.
#[tokio::test]
async fn test_fetch_by_hash_camel_case_parent() {
    let mock_server = MockServer::start().await;

    let cast_response = serde_json::json!({
        "cast": {
            "text": "",
            "embeds": [],
            "parentHash": "0x1111111111111111111111111111111111111111"
        }
    });

    Mock::given(method("GET"))
        .and(path("/farcaster/cast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cast_response))
        .mount(&mock_server)
        .await;

    let client = CastClient::with_base_url("test_key", mock_server.uri());
    let cast = client.fetch_by_hash(HASH).await.expect("fetch should succeed");

    assert_eq!(
        cast.parent_hash.as_deref(),
        Some("0x1111111111111111111111111111111111111111")
    );
}

/// Test that a non-2xx status maps to a fatal fetch error with the status.
#[tokio::test]
async fn test_fetch_by_hash_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/farcaster/cast"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = CastClient::with_base_url("test_key", mock_server.uri());
    let err = client.fetch_by_hash(HASH).await.unwrap_err();

    match err {
        SkaldError::CastFetch { status, .. } => assert_eq!(status, 404),
        other => panic!("expected CastFetch, got {other:?}"),
    }
}

/// A failed cast fetch is never classified transient; retries are the
/// caller's choice, not this layer's.
#[tokio::test]
async fn test_fetch_error_is_not_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/farcaster/cast"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CastClient::with_base_url("test_key", mock_server.uri());
    let err = client.fetch_by_hash(HASH).await.unwrap_err();

    assert!(matches!(err, SkaldError::CastFetch { status: 503, .. }));
    assert!(!err.is_transient());
}

/// Test that an envelope without a cast is a transport-level error.
#[tokio::test]
async fn test_fetch_by_hash_malformed_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/farcaster/cast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = CastClient::with_base_url("test_key", mock_server.uri());
    let err = client.fetch_by_hash(HASH).await.unwrap_err();

    assert!(matches!(err, SkaldError::Http(_)));
}
