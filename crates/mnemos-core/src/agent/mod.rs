//! Conversation agents.

use crate::error::CoreError;
use crate::session::{SessionState, TurnReport};
use async_trait::async_trait;
use mnemos_memory::LongTermRecord;

mod history;
mod memory;

pub use history::{StatefulAgent, StatelessAgent};
pub use memory::{LongTermContext, MemoryAgent};

/// How an agent carries context between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    /// Only the current input is sent.
    Stateless,
    /// The whole history is sent.
    Stateful,
    /// Recent window plus rolling digest.
    Memory,
    /// Memory mode plus a persisted per-identity record.
    LongTerm,
}

impl AgentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::Stateless => "stateless",
            AgentMode::Stateful => "stateful",
            AgentMode::Memory => "memory",
            AgentMode::LongTerm => "long-term",
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
/// A multi-turn agent driven by an interactive loop.
pub trait ConversationAgent: Send {
    fn mode(&self) -> AgentMode;

    /// Session state after the last completed turn.
    fn session(&self) -> &SessionState;

    /// Run one turn. On error the pending input is rolled back.
    async fn respond(&mut self, input: &str) -> Result<TurnReport, CoreError>;

    /// End the session. Returns the persisted long-term record when one was
    /// written.
    async fn finish(&mut self) -> Result<Option<LongTermRecord>, CoreError> {
        Ok(None)
    }
}
