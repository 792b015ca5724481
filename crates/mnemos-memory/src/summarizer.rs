//! Rolling digest maintenance.

use crate::digest::{Digest, DigestStyle};
use crate::error::MemoryError;
use crate::text::render_transcript;
use log::{debug, info};
use mnemos_llm::{ChatProvider, ChatRequest, Message, ResponseFormat};
use std::sync::Arc;

/// Per-message character budget in the summarization view.
pub const DEFAULT_SUMMARY_MESSAGE_CHARS: usize = 500;

const EMPTY_MEMORY: &str = "(empty)";

/// Folds messages leaving the recent window into the digest.
#[derive(Clone)]
pub struct Summarizer {
    llm: Arc<dyn ChatProvider>,
    model: String,
    style: DigestStyle,
    message_chars: usize,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn ChatProvider>, model: impl Into<String>, style: DigestStyle) -> Self {
        Self {
            llm,
            model: model.into(),
            style,
            message_chars: DEFAULT_SUMMARY_MESSAGE_CHARS,
        }
    }

    /// Override the per-message truncation applied to the request view.
    pub fn with_message_chars(mut self, message_chars: usize) -> Self {
        self.message_chars = message_chars;
        self
    }

    pub fn style(&self) -> DigestStyle {
        self.style
    }

    /// Merge `older` into `existing` and return the new digest.
    ///
    /// No request is made when `older` is empty. Errors leave the caller's
    /// digest untouched.
    pub async fn summarize(
        &self,
        existing: Option<&Digest>,
        older: &[Message],
    ) -> Result<Option<Digest>, MemoryError> {
        if older.is_empty() {
            return Ok(existing.cloned());
        }
        let request = self.build_request(existing, older);
        debug!(
            "summarize request (style={}, folded_messages={})",
            self.style,
            older.len()
        );
        let response = self.llm.chat(&request).await?;
        let digest = Digest::parse(self.style, &response.content)?;
        info!(
            "digest updated (style={}, folded_messages={}, chars={})",
            self.style,
            older.len(),
            digest.render().chars().count()
        );
        Ok(Some(digest))
    }

    fn build_request(&self, existing: Option<&Digest>, older: &[Message]) -> ChatRequest {
        let memory = existing
            .map(Digest::render)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| EMPTY_MEMORY.to_string());
        let prompt = format!(
            "EXISTING MEMORY:\n{memory}\n\nNEW TURNS TO INCORPORATE:\n{}",
            render_transcript(older, self.message_chars)
        );
        let request = ChatRequest::new(
            self.model.clone(),
            vec![
                Message::system(self.style.instructions()),
                Message::user(prompt),
            ],
        )
        .with_temperature(0.0);
        match self.style {
            DigestStyle::Json => request.with_response_format(ResponseFormat::JsonObject),
            DigestStyle::Bullets | DigestStyle::Tldr => request,
        }
    }
}
