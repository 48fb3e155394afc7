//! Wiremock integration tests for GeminiClient.
//!
//! Covers reply normalization, retry classification, image inlining,
//! and the all-or-nothing image batch.

use std::time::Duration;

use skald::SkaldError;
use skald::providers::GeminiClient;
use skald::retry::RetryConfig;
use skald::types::{LlmRequest, LlmResult, Mode};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn reply_json(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": text}]}}
        ]
    })
}

fn client(mock_server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url("test_key", mock_server.uri()).retry(
        RetryConfig::new()
            .max_attempts(3)
            .base_delay(Duration::from_millis(1)),
    )
}

#[tokio::test]
async fn test_generate_parses_fenced_translation_reply() {
    let mock_server = MockServer::start().await;

    let fenced = "```json\n{\"source_lang\":\"en\",\"target_lang\":\"vi\",\
                  \"unchanged\":false,\"translated\":\"xin chào thế giới\",\"notes\":[]}\n```";
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_json(fenced)))
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Translate, "hello world", "vi");
    let result = client(&mock_server).generate(&request).await.unwrap();

    match result {
        LlmResult::Translation(t) => {
            assert_eq!(t.translated, "xin chào thế giới");
            assert!(!t.unchanged);
        }
        other => panic!("expected translation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_retries_503_then_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_json(r#"{"content":"hi there"}"#)),
        )
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Chat, "hello", "vi");
    let result = client(&mock_server).generate(&request).await.unwrap();

    assert!(matches!(result, LlmResult::Chat(c) if c.content == "hi there"));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_auth_failure_short_circuits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Translate, "hello", "vi");
    let err = client(&mock_server).generate(&request).await.unwrap_err();

    assert!(matches!(err, SkaldError::AuthenticationFailed));
}

#[tokio::test]
async fn test_prose_reply_without_json_is_typed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply_json("sorry, I cannot translate this")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Translate, "hello", "vi");
    let err = client(&mock_server).generate(&request).await.unwrap_err();

    assert!(matches!(err, SkaldError::NoJsonPayload));
}

/// A reply that contains an object but fails to parse is fatal; the
/// single mocked call (`expect(1)`) proves it is never retried.
#[tokio::test]
async fn test_malformed_reply_is_fatal_and_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_json("{\"translated\": oops}")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Translate, "hello", "vi");
    let err = client(&mock_server).generate(&request).await.unwrap_err();

    assert!(matches!(err, SkaldError::MalformedReply(_)));
}

/// An empty candidate list is classified transient and retried.
#[tokio::test]
async fn test_empty_reply_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_json(r#"{"content":"ok"}"#)),
        )
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Chat, "hello", "vi");
    let result = client(&mock_server).generate(&request).await.unwrap();

    assert!(matches!(result, LlmResult::Chat(_)));
}

/// One broken image link sinks the whole call before the model is
/// ever invoked.
#[tokio::test]
async fn test_image_fetch_failure_aborts_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/broken.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_json("{}")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = LlmRequest::new(Mode::Translate, "hello", "vi")
        .with_images(vec![format!("{}/img/broken.png", mock_server.uri())]);
    let err = client(&mock_server).generate(&request).await.unwrap_err();

    assert!(matches!(err, SkaldError::Api { status: 404, .. }));
}

/// Only the first three image URLs are fetched and inlined.
#[tokio::test]
async fn test_inlines_at_most_three_images() {
    let mock_server = MockServer::start().await;

    for i in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/img/{i}.png")))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/img/4.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
        )
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_json(
                r#"{"source_lang":"en","target_lang":"vi","unchanged":false,"translated":"ok","notes":[]}"#,
            )),
        )
        .mount(&mock_server)
        .await;

    let image_urls = (1..=4)
        .map(|i| format!("{}/img/{i}.png", mock_server.uri()))
        .collect();
    let request = LlmRequest::new(Mode::Translate, "hello", "vi").with_images(image_urls);
    let result = client(&mock_server).generate(&request).await;

    assert!(result.is_ok());
}
