//! Completion collaborator interface and the OpenAI-compatible HTTP client.
//!
//! Everything above this crate talks to the hosted model through
//! [`ChatProvider`]; the HTTP client is one implementation and the test
//! utilities provide scripted ones.

mod error;
mod message;
mod openai;
mod provider;
mod sse;

/// Collaborator error type.
pub use error::LlmError;
/// Chat message model.
pub use message::{Message, Role};
/// OpenAI-compatible HTTP provider.
pub use openai::{OPENAI_BASE_URL, OPENROUTER_BASE_URL, OpenAiClient, OpenAiClientBuilder};
/// Provider trait and request/response types.
pub use provider::{ChatProvider, ChatRequest, ChatResponse, ChatStream, ResponseFormat, Usage};
