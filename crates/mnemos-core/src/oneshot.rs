//! Single-request completions, blocking and streamed.

use crate::error::CoreError;
use crate::settings::AgentSettings;
use futures_util::StreamExt;
use log::debug;
use mnemos_llm::{ChatProvider, ChatRequest, Message, Usage};
use std::time::{Duration, Instant};

/// Result of a one-shot completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    /// Zero for streamed completions, which do not report usage.
    pub usage: Usage,
    pub elapsed: Duration,
}

fn request(settings: &AgentSettings, prompt: &str) -> ChatRequest {
    ChatRequest::new(settings.model.clone(), vec![Message::user(prompt)])
        .with_temperature(settings.temperature)
}

/// Send one user message and wait for the full reply.
pub async fn complete(
    llm: &dyn ChatProvider,
    settings: &AgentSettings,
    prompt: &str,
) -> Result<Completion, CoreError> {
    let started = Instant::now();
    let response = llm.chat(&request(settings, prompt)).await?;
    debug!(
        "completion finished (model={}, output_tokens={})",
        settings.model, response.usage.completion_tokens
    );
    Ok(Completion {
        content: response.content,
        usage: response.usage,
        elapsed: started.elapsed(),
    })
}

/// Send one user message and pass each content delta to `on_delta` as it
/// arrives.
pub async fn stream_completion<F>(
    llm: &dyn ChatProvider,
    settings: &AgentSettings,
    prompt: &str,
    mut on_delta: F,
) -> Result<Completion, CoreError>
where
    F: FnMut(&str) + Send,
{
    let started = Instant::now();
    let mut stream = llm.chat_stream(&request(settings, prompt)).await?;
    let mut content = String::new();
    let mut chunks = 0usize;
    while let Some(delta) = stream.next().await {
        let delta = delta?;
        on_delta(&delta);
        content.push_str(&delta);
        chunks += 1;
    }
    debug!(
        "stream finished (model={}, chunks={}, chars={})",
        settings.model,
        chunks,
        content.chars().count()
    );
    Ok(Completion {
        content,
        usage: Usage::default(),
        elapsed: started.elapsed(),
    })
}
