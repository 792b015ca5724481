//! System prompt and message assembly for memory-backed turns.

use crate::digest::Digest;
use crate::record::LongTermRecord;
use mnemos_llm::Message;

/// Base instructions for every assembled prompt.
pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant with memory.\n\
Use the memory below naturally as context when relevant and focus on the recent conversation. \
Don't explicitly mention \"my memory says\".";

const SECTION_SEPARATOR: &str = "\n\n---\n\n";
const LONG_TERM_HEADER: &str = "=== LONG-TERM MEMORY (persists across conversations) ===";
const SHORT_TERM_HEADER: &str = "=== SHORT-TERM MEMORY (summary of earlier conversation) ===";
const NO_LONG_TERM: &str = "(No long-term memory yet for this user)";
const NO_SHORT_TERM: &str = "(Conversation just started)";

/// Builds the message list sent for a single turn.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    instructions: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUCTIONS)
    }
}

impl PromptAssembler {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    /// Render the system prompt: instructions, the long-term section when a
    /// record is supplied, then the short-term section.
    pub fn system_prompt(
        &self,
        long_term: Option<&LongTermRecord>,
        digest: Option<&Digest>,
    ) -> String {
        let mut sections = vec![self.instructions.clone()];
        if let Some(record) = long_term {
            let body = if record.is_empty() {
                NO_LONG_TERM.to_string()
            } else {
                record.render()
            };
            sections.push(format!("{LONG_TERM_HEADER}\n{body}"));
        }
        let digest_body = digest
            .filter(|digest| !digest.is_empty())
            .map(Digest::render)
            .unwrap_or_else(|| NO_SHORT_TERM.to_string());
        sections.push(format!("{SHORT_TERM_HEADER}\n{digest_body}"));
        sections.join(SECTION_SEPARATOR)
    }

    /// System prompt, then `recent` verbatim, then the current input.
    pub fn assemble(
        &self,
        long_term: Option<&LongTermRecord>,
        digest: Option<&Digest>,
        recent: &[Message],
        input: &str,
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Message::system(self.system_prompt(long_term, digest)));
        messages.extend(recent.iter().cloned());
        messages.push(Message::user(input));
        messages
    }
}
