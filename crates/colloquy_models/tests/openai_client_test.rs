use colloquy_core::{GenerateRequest, Message};
use colloquy_error::{ColloquyErrorKind, ModelsErrorKind, OpenAIErrorKind};
use colloquy_interface::ColloquyDriver;
use colloquy_models::{OpenAIClient, classify_error};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> GenerateRequest {
    GenerateRequest::builder()
        .messages(vec![
            Message::system("You are a helpful assistant."),
            Message::user("Hi"),
        ])
        .temperature(Some(0.75))
        .max_tokens(Some(150))
        .model(Some("gpt-3.5-turbo".to_string()))
        .build()
        .expect("build request")
}

#[tokio::test]
async fn generate_maps_reply_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 150,
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-123",
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello! How can I help?"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 21, "completion_tokens": 7, "total_tokens": 28}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new("test-key", "gpt-4o-mini")
        .with_base_url(format!("{}/v1", server.uri()));
    let response = client.generate(&request()).await.expect("generate");

    assert_eq!(response.text(), "Hello! How can I help?");
    assert_eq!(*response.usage().input_tokens(), 21);
    assert_eq!(*response.usage().output_tokens(), 7);
    assert_eq!(*response.usage().total_tokens(), 28);
    assert_eq!(response.finish_reason().as_deref(), Some("stop"));
}

#[tokio::test]
async fn quota_errors_surface_as_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("test-key", "gpt-3.5-turbo")
        .with_base_url(format!("{}/v1", server.uri()));
    let err = client.generate(&request()).await.unwrap_err();

    match err.kind() {
        ColloquyErrorKind::Models(models) => assert!(matches!(
            models.kind,
            ModelsErrorKind::OpenAI(OpenAIErrorKind::RateLimit(_))
        )),
        other => panic!("unexpected error kind: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("test-key", "gpt-3.5-turbo")
        .with_base_url(format!("{}/v1", server.uri()));
    let err = client.generate(&request()).await.unwrap_err();

    match err.kind() {
        ColloquyErrorKind::Models(models) => {
            assert!(matches!(models.kind, ModelsErrorKind::OpenAI(OpenAIErrorKind::Parse(_))))
        }
        other => panic!("unexpected error kind: {other}"),
    }
}

#[tokio::test]
async fn slow_endpoint_surfaces_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "late", "choices": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = OpenAIClient::new("test-key", "gpt-3.5-turbo")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_timeout(Duration::from_millis(100));
    let err = client.generate(&request()).await.unwrap_err();

    assert!(err.to_string().contains("timed out"), "got: {err}");
    match err.kind() {
        ColloquyErrorKind::Models(models) => {
            assert!(matches!(
                models.kind,
                ModelsErrorKind::OpenAI(OpenAIErrorKind::Timeout(_))
            ));
            assert_eq!(classify_error(models), "timeout");
        }
        other => panic!("unexpected error kind: {other}"),
    }
}

#[test]
fn missing_api_key_is_a_config_error() {
    let err = OpenAIClient::from_env("COLLOQUY_TEST_DEFINITELY_UNSET_KEY", "gpt-3.5-turbo")
        .unwrap_err();
    assert!(matches!(err.kind(), ColloquyErrorKind::Config(_)));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)] // Requires OPENAI_API_KEY
async fn live_completion_round_trip() {
    let _ = dotenvy::dotenv();
    let client = OpenAIClient::from_env("OPENAI_API_KEY", "gpt-3.5-turbo").expect("client");
    let response = client.generate(&request()).await.expect("generate");
    assert!(!response.text().is_empty());
}
