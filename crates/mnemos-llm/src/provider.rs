//! Provider abstraction for chat completions.

use crate::error::LlmError;
use crate::message::Message;
use async_trait::async_trait;
use futures_util::Stream;
use futures_util::stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Boxed stream of content deltas.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Requested shape of the assistant output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Model selector.
    pub model: String,
    /// Ordered, role-tagged messages.
    pub messages: Vec<Message>,
    /// Sampling temperature; provider default when unset.
    pub temperature: Option<f32>,
    /// Output shape.
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// Token usage counters reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Assistant reply plus usage.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>, usage: Usage) -> Self {
        Self {
            content: content.into(),
            usage,
        }
    }
}

#[async_trait]
/// Completion collaborator used by agents, the summarizer and the extractor.
pub trait ChatProvider: Send + Sync {
    /// Send the request and wait for the full reply.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Stream content deltas. Providers without streaming yield the full reply once.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<ChatStream, LlmError> {
        let response = self.chat(request).await?;
        Ok(Box::pin(stream::iter(vec![Ok(response.content)])))
    }
}
