//! Per-session conversation state and turn reports.

use chrono::{DateTime, Utc};
use mnemos_llm::{Message, Usage};
use mnemos_memory::{Digest, TurnStore};
use std::time::Duration;
use uuid::Uuid;

/// State of one interactive session, owned by its agent.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Messages currently sent to the collaborator.
    pub turns: TurnStore,
    /// Every completed message of the session, never compressed.
    pub transcript: Vec<Message>,
    pub digest: Option<Digest>,
    /// Completed turns.
    pub turn_number: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            turns: TurnStore::new(),
            transcript: Vec::new(),
            digest: None,
            turn_number: 0,
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    /// Rendered digest length in characters.
    pub fn digest_chars(&self) -> usize {
        self.digest
            .as_ref()
            .map_or(0, |digest| digest.render().chars().count())
    }

    /// Append a user message to both the store and the transcript.
    pub(crate) fn begin_turn(&mut self, input: &str) {
        let message = Message::user(input);
        self.turns.push(message.clone());
        self.transcript.push(message);
    }

    /// Undo `begin_turn` after a failed chat call.
    pub(crate) fn rollback_turn(&mut self) {
        if self.turns.pop_pending_user().is_some() {
            self.transcript.pop();
        }
    }

    /// Record the assistant reply and usage for the pending turn.
    pub(crate) fn complete_turn(&mut self, reply: &str, usage: Usage) {
        let message = Message::assistant(reply);
        self.turns.push(message.clone());
        self.transcript.push(message);
        self.turn_number += 1;
        self.input_tokens += usage.prompt_tokens;
        self.output_tokens += usage.completion_tokens;
    }
}

/// Outcome of one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub turn: u64,
    pub reply: String,
    pub elapsed: Duration,
    pub usage: Usage,
    /// Messages held in the window or history after the turn.
    pub context_messages: usize,
    pub digest_chars: usize,
    /// Whether older messages were folded into the digest this turn.
    pub compressed: bool,
}
