//! HTTP client tests against a local mock server.

use futures_util::StreamExt;
use mnemos_llm::{ChatProvider, ChatRequest, LlmError, Message, OpenAiClient, ResponseFormat};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    OpenAiClient::builder("test-key")
        .base_url(format!("{}/v1", server.uri()))
        .build()
        .expect("client")
}

/// Plain chat returns content and usage counters.
#[tokio::test]
async fn chat_returns_content_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-mini",
            "messages": [{ "role": "user", "content": "Say hello." }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello!" } }],
            "usage": { "prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11 }
        })))
        .mount(&server)
        .await;

    let request = ChatRequest::new("gpt-4.1-mini", vec![Message::user("Say hello.")]);
    let response = client_for(&server).chat(&request).await.expect("chat");

    assert_eq!(response.content, "Hello!");
    assert_eq!(response.usage.prompt_tokens, 9);
    assert_eq!(response.usage.completion_tokens, 2);
}

/// JSON mode is forwarded as `response_format`.
#[tokio::test]
async fn chat_forwards_json_response_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "response_format": { "type": "json_object" },
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "{}" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new("m", vec![Message::user("x")])
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::JsonObject);
    let response = client_for(&server).chat(&request).await.expect("chat");
    assert_eq!(response.content, "{}");
}

/// Non-success statuses surface as `LlmError::Status`.
#[tokio::test]
async fn chat_surfaces_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let request = ChatRequest::new("m", vec![Message::user("x")]);
    let err = client_for(&server).chat(&request).await.unwrap_err();
    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// A reply without choices is an empty response, not a panic.
#[tokio::test]
async fn chat_rejects_missing_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let request = ChatRequest::new("m", vec![Message::user("x")]);
    let err = client_for(&server).chat(&request).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

/// Streaming yields each non-empty delta and stops at `[DONE]`.
#[tokio::test]
async fn stream_yields_deltas_until_done() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Calls \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"and replies\"}}]}\n\n",
        "data: [DONE]\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
    );
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let request = ChatRequest::new("m", vec![Message::user("haiku")]);
    let mut stream = client_for(&server)
        .chat_stream(&request)
        .await
        .expect("stream");
    let mut deltas = Vec::new();
    while let Some(delta) = stream.next().await {
        deltas.push(delta.expect("delta"));
    }
    assert_eq!(deltas, vec!["Calls ".to_string(), "and replies".to_string()]);
}

/// An error object inside the stream ends it with `LlmError::Stream`.
#[tokio::test]
async fn stream_surfaces_inline_error() {
    let server = MockServer::start().await;
    let body = "data: {\"error\":{\"message\":\"overloaded\"}}\n\n";
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let request = ChatRequest::new("m", vec![Message::user("x")]);
    let mut stream = client_for(&server)
        .chat_stream(&request)
        .await
        .expect("stream");
    let first = stream.next().await.expect("item");
    assert!(matches!(first, Err(LlmError::Stream(message)) if message == "overloaded"));
}
