//! Long-term fact and preference extraction with a bounded merge policy.

use crate::error::MemoryError;
use crate::record::LongTermRecord;
use crate::text::{
    clamp_words, item_key, redact_high_entropy, render_transcript, strip_code_fence,
    truncate_chars,
};
use chrono::Utc;
use log::{debug, info};
use mnemos_llm::{ChatProvider, ChatRequest, Message, ResponseFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const EXTRACTION_PROMPT: &str = "You extract long-term memory about a user from a conversation.\n\
Keep only durable information worth remembering in future conversations:\n\
- facts: name, job, location, ongoing projects, expertise, decisions\n\
- preferences: communication style, tools, likes and dislikes\n\
Do NOT include temporary details, questions asked only for this session, or secrets such as passwords and API keys.\n\
Return a JSON object with keys \"facts\", \"preferences\", and \"superseded\".\n\
\"facts\" and \"preferences\" list new or updated items, at most 10 each, as short sentences.\n\
\"superseded\" lists existing items, copied exactly, that the conversation shows are no longer true.\n\
Output only the JSON object.";

/// Bounds applied when merging extracted items into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionPolicy {
    pub max_facts: usize,
    pub max_preferences: usize,
    pub max_item_chars: usize,
    /// Per-message character budget in the extraction view.
    pub message_chars: usize,
    pub redact_secrets: bool,
    pub secret_entropy_threshold: f32,
    pub redaction_replacement: String,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            max_facts: 10,
            max_preferences: 10,
            max_item_chars: 200,
            message_chars: 300,
            redact_secrets: true,
            secret_entropy_threshold: 3.7,
            redaction_replacement: "[REDACTED]".to_string(),
        }
    }
}

/// Items observed in one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMemory {
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Existing items contradicted by the conversation.
    #[serde(default)]
    pub superseded: Vec<String>,
}

impl ExtractedMemory {
    /// Parse untrusted collaborator output.
    pub fn parse(raw: &str) -> Result<Self, MemoryError> {
        let value: serde_json::Value = serde_json::from_str(strip_code_fence(raw))
            .map_err(|err| MemoryError::InvalidOutput(format!("extraction is not JSON: {err}")))?;
        if !value.is_object() {
            return Err(MemoryError::InvalidOutput(
                "extraction is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|err| {
            MemoryError::InvalidOutput(format!("extraction has unexpected shape: {err}"))
        })
    }
}

/// Distills a finished conversation into a long-term record.
#[derive(Clone)]
pub struct Extractor {
    llm: Arc<dyn ChatProvider>,
    model: String,
    policy: ExtractionPolicy,
}

impl Extractor {
    pub fn new(llm: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            policy: ExtractionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ExtractionPolicy {
        &self.policy
    }

    /// Extract durable items from `transcript` and merge them into `existing`.
    ///
    /// An empty transcript returns `existing` without a request. On error the
    /// caller keeps its stored record.
    pub async fn extract(
        &self,
        transcript: &[Message],
        existing: &LongTermRecord,
    ) -> Result<LongTermRecord, MemoryError> {
        if transcript.is_empty() {
            return Ok(existing.clone());
        }
        let request = self.build_request(transcript, existing)?;
        debug!(
            "extract request (messages={}, existing_facts={}, existing_preferences={})",
            transcript.len(),
            existing.facts.len(),
            existing.preferences.len()
        );
        let response = self.llm.chat(&request).await?;
        let observed = ExtractedMemory::parse(&response.content)?;
        let merged = self.merge(existing, observed);
        info!(
            "long-term record merged (facts={}, preferences={})",
            merged.facts.len(),
            merged.preferences.len()
        );
        Ok(merged)
    }

    /// Apply the merge policy: drop superseded items, union with
    /// case-insensitive de-duplication, sanitize observed items, then cap
    /// each list by evicting the oldest existing items first.
    pub fn merge(&self, existing: &LongTermRecord, observed: ExtractedMemory) -> LongTermRecord {
        let superseded: HashSet<String> =
            observed.superseded.iter().map(|item| item_key(item)).collect();
        let facts = merge_items(
            &existing.facts,
            &observed.facts,
            &superseded,
            self.policy.max_facts,
            |item| self.sanitize(item),
        );
        let preferences = merge_items(
            &existing.preferences,
            &observed.preferences,
            &superseded,
            self.policy.max_preferences,
            |item| self.sanitize(item),
        );
        LongTermRecord {
            facts,
            preferences,
            updated_at: Some(Utc::now()),
        }
    }

    fn sanitize(&self, item: &str) -> String {
        let item = clamp_words(item, usize::MAX);
        let item = if self.policy.redact_secrets {
            redact_high_entropy(
                &item,
                self.policy.secret_entropy_threshold,
                &self.policy.redaction_replacement,
            )
        } else {
            item
        };
        truncate_chars(&item, self.policy.max_item_chars)
    }

    fn build_request(
        &self,
        transcript: &[Message],
        existing: &LongTermRecord,
    ) -> Result<ChatRequest, MemoryError> {
        let existing_json = serde_json::to_string(&serde_json::json!({
            "facts": existing.facts,
            "preferences": existing.preferences,
        }))?;
        let prompt = format!(
            "EXISTING MEMORY:\n{existing_json}\n\nCONVERSATION:\n{}",
            render_transcript(transcript, self.policy.message_chars)
        );
        Ok(ChatRequest::new(
            self.model.clone(),
            vec![Message::system(EXTRACTION_PROMPT), Message::user(prompt)],
        )
        .with_temperature(0.0)
        .with_response_format(ResponseFormat::JsonObject))
    }
}

struct Slot {
    key: String,
    text: String,
    observed: bool,
}

fn merge_items(
    existing: &[String],
    observed: &[String],
    superseded: &HashSet<String>,
    max_items: usize,
    sanitize: impl Fn(&str) -> String,
) -> Vec<String> {
    let mut slots: Vec<Slot> = Vec::new();
    let candidates = existing
        .iter()
        .map(|item| (item, false))
        .chain(observed.iter().map(|item| (item, true)));
    for (item, is_observed) in candidates {
        // Stored items are kept verbatim; only new output is sanitized.
        let text = if is_observed {
            sanitize(item)
        } else {
            item.clone()
        };
        if text.trim().is_empty() {
            continue;
        }
        let key = item_key(&text);
        if !is_observed && superseded.contains(&key) {
            continue;
        }
        match slots.iter_mut().find(|slot| slot.key == key) {
            Some(slot) if is_observed => {
                slot.text = text;
                slot.observed = true;
            }
            Some(_) => {}
            None => slots.push(Slot {
                key,
                text,
                observed: is_observed,
            }),
        }
    }
    while slots.len() > max_items {
        match slots.iter().position(|slot| !slot.observed) {
            Some(index) => {
                slots.remove(index);
            }
            None => slots.truncate(max_items),
        }
    }
    slots.into_iter().map(|slot| slot.text).collect()
}
