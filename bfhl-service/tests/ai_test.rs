//! AI gateway behaviour through the HTTP surface, with providers mocked by wiremock.

mod common;

use bfhl_service::config::{AiConfig, AiProvider, BfhlConfig};
use bfhl_service::services::providers::mock::MockTextProvider;
use common::{error_message, test_config, TestApp};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_config(server: &MockServer, model: Option<&str>) -> BfhlConfig {
    let mut config = test_config();
    config.ai = AiConfig {
        provider: AiProvider::Gemini,
        api_key: Some(Secret::new("test-key".to_string())),
        model: model.map(str::to_string),
        base_url: Some(server.uri()),
        timeout: Duration::from_secs(2),
    };
    config
}

fn openai_config(server: &MockServer) -> BfhlConfig {
    let mut config = test_config();
    config.ai = AiConfig {
        provider: AiProvider::OpenAi,
        api_key: Some(Secret::new("groq-key".to_string())),
        model: None,
        base_url: Some(server.uri()),
        timeout: Duration::from_secs(2),
    };
    config
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

async fn answer(response: reqwest::Response) -> String {
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["is_success"], true);
    body["data"].as_str().expect("data must be a string").to_string()
}

#[tokio::test]
async fn gemini_answer_is_first_word_of_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("**Paris** is the capital.")))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, Some("gemini-test"))).await;
    let response = app
        .post_bfhl(&json!({"AI": "What is the capital of France?"}))
        .await;

    assert_eq!(answer(response).await, "Paris");
}

#[tokio::test]
async fn gemini_model_is_discovered_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent"]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Seven")))
        .expect(2)
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, None)).await;

    let first = app.post_bfhl(&json!({"AI": "How many continents?"})).await;
    assert_eq!(answer(first).await, "Seven");
    let second = app.post_bfhl(&json!({"AI": "How many days in a week?"})).await;
    assert_eq!(answer(second).await, "Seven");
}

#[tokio::test]
async fn failed_discovery_is_retried_on_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/gemini-pro", "supportedGenerationMethods": ["generateContent"]}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Blue")))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, None)).await;

    let error = error_message(app.post_bfhl(&json!({"AI": "Sky colour?"})).await, 500).await;
    assert!(error.contains("503"), "unexpected error: {}", error);

    let response = app.post_bfhl(&json!({"AI": "Sky colour?"})).await;
    assert_eq!(answer(response).await, "Blue");
}

#[tokio::test]
async fn provider_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, Some("gemini-test"))).await;
    let error = error_message(app.post_bfhl(&json!({"AI": "Anything?"})).await, 500).await;
    assert!(error.contains("HTTP 429"), "unexpected error: {}", error);
}

#[tokio::test]
async fn unexpected_reply_shape_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, Some("gemini-test"))).await;
    let error = error_message(app.post_bfhl(&json!({"AI": "Anything?"})).await, 500).await;
    assert!(error.contains("unexpected response"), "unexpected error: {}", error);
}

#[tokio::test]
async fn reply_without_word_is_empty_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(" ... ")))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, Some("gemini-test"))).await;
    let error = error_message(app.post_bfhl(&json!({"AI": "Anything?"})).await, 500).await;
    assert_eq!(error, "AI returned empty answer.");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("Late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = gemini_config(&server, Some("gemini-test"));
    config.ai.timeout = Duration::from_millis(300);
    let app = TestApp::spawn_with(config).await;

    let error = error_message(app.post_bfhl(&json!({"AI": "Anything?"})).await, 500).await;
    assert!(error.contains("timed out"), "unexpected error: {}", error);
}

#[tokio::test]
async fn unreachable_provider_does_not_leak_credential() {
    // Reserve a port, then free it so nothing is listening there.
    let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let base_url = format!("http://{}", closed.local_addr().expect("No local address"));
    drop(closed);

    let mut config = test_config();
    config.ai = AiConfig {
        provider: AiProvider::Gemini,
        api_key: Some(Secret::new("SUPER-SECRET-KEY".to_string())),
        model: Some("gemini-test".to_string()),
        base_url: Some(base_url),
        timeout: Duration::from_secs(2),
    };
    let app = TestApp::spawn_with(config).await;

    let error = error_message(app.post_bfhl(&json!({"AI": "Anything?"})).await, 500).await;
    assert!(error.contains("unreachable"), "unexpected error: {}", error);
    assert!(!error.contains("SUPER-SECRET-KEY"), "credential leaked: {}", error);
}

#[tokio::test]
async fn missing_credential_is_misconfiguration() {
    let server = MockServer::start().await;
    let mut config = gemini_config(&server, Some("gemini-test"));
    config.ai.api_key = None;
    let app = TestApp::spawn_with(config).await;

    let error = error_message(app.post_bfhl(&json!({"AI": "Anything?"})).await, 500).await;
    assert_eq!(error, "AI provider API key is not configured.");
}

#[tokio::test]
async fn openai_compatible_provider_uses_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer groq-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Jupiter."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(openai_config(&server)).await;
    let response = app.post_bfhl(&json!({"AI": "Largest planet?"})).await;

    assert_eq!(answer(response).await, "Jupiter");
}

#[tokio::test]
async fn invalid_questions_never_reach_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Never")))
        .expect(0)
        .mount(&server)
        .await;

    let app = TestApp::spawn_with(gemini_config(&server, Some("gemini-test"))).await;

    let error = error_message(app.post_bfhl(&json!({"AI": ""})).await, 400).await;
    assert_eq!(error, "AI must be a non-empty string.");

    let long = "x".repeat(600);
    let error = error_message(app.post_bfhl(&json!({ "AI": long })).await, 400).await;
    assert_eq!(error, "AI string too long (max 500).");

    let error = error_message(app.post_bfhl(&json!({"AI": ["a"]})).await, 400).await;
    assert_eq!(error, "AI must be a string.");
}

#[tokio::test]
async fn injected_provider_is_used() {
    let app = TestApp::spawn_with_provider(
        test_config(),
        Arc::new(MockTextProvider::replying("Everest, at 8849 m")),
    )
    .await;

    let response = app.post_bfhl(&json!({"AI": "Tallest mountain?"})).await;
    assert_eq!(answer(response).await, "Everest");
}
