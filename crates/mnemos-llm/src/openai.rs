//! OpenAI-compatible `/chat/completions` client.

use crate::error::LlmError;
use crate::message::Message;
use crate::provider::{ChatProvider, ChatRequest, ChatResponse, ChatStream, ResponseFormat, Usage};
use crate::sse::{SseDecoder, SseEvent};
use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL of the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Base URL of the OpenRouter API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP chat provider speaking the OpenAI wire format.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Start a client for the OpenAI API; override the base URL for
    /// OpenRouter or another compatible host.
    pub fn builder(api_key: impl Into<String>) -> OpenAiClientBuilder {
        OpenAiClientBuilder {
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: &WireRequest<'_>) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(
            "provider rejected request (status={}, body_len={})",
            status.as_u16(),
            body.len()
        );
        Err(LlmError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Builder for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClientBuilder {
    /// Point the client at another OpenAI-compatible API (e.g. OpenRouter).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Ceiling for a whole request, including streamed bodies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenAiClient, LlmError> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        info!(
            "initialized chat client (base_url={}, timeout_secs={})",
            self.base_url,
            self.timeout.as_secs()
        );
        Ok(OpenAiClient {
            client,
            base_url: self.base_url,
            api_key: self.api_key,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        debug!(
            "chat request (model={}, messages={}, format={:?})",
            request.model,
            request.messages.len(),
            request.response_format
        );
        let body = WireRequest::new(request, false);
        let text = self.send(&body).await?.text().await?;
        let wire: WireResponse = serde_json::from_str(&text)?;
        let usage = wire.usage.unwrap_or_default();
        let content = wire
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;
        debug!(
            "chat response (content_len={}, prompt_tokens={}, completion_tokens={})",
            content.len(),
            usage.prompt_tokens,
            usage.completion_tokens
        );
        Ok(ChatResponse { content, usage })
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream, LlmError> {
        debug!(
            "chat stream request (model={}, messages={})",
            request.model,
            request.messages.len()
        );
        let body = WireRequest::new(request, true);
        let response = self.send(&body).await?;
        Ok(Box::pin(content_deltas(response.bytes_stream())))
    }
}

/// Turn a raw SSE byte stream into content deltas.
fn content_deltas<S, B>(bytes: S) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send,
{
    try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = SseDecoder::default();
        let mut chunks = 0usize;
        'read: while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for event in decoder.push(chunk.as_ref()) {
                let data = match event {
                    SseEvent::Done => break 'read,
                    SseEvent::Data(data) => data,
                };
                let parsed: WireChunk = serde_json::from_str(&data)?;
                if let Some(error) = parsed.error {
                    Err::<(), _>(LlmError::Stream(error.message))?;
                }
                let delta = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .unwrap_or_default();
                if !delta.is_empty() {
                    chunks += 1;
                    yield delta;
                }
            }
        }
        debug!("chat stream closed (chunks={})", chunks);
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

impl<'a> WireRequest<'a> {
    fn new(request: &'a ChatRequest, stream: bool) -> Self {
        let response_format = match request.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(WireResponseFormat {
                kind: "json_object",
            }),
        };
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format,
            stream,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    #[serde(default)]
    choices: Vec<WireDeltaChoice>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireDeltaChoice {
    #[serde(default)]
    delta: WireDelta,
}

#[derive(Debug, Default, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}
