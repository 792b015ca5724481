//! Conversational agents for Mnemos.
//!
//! This crate owns session state and the agent modes built on top of the
//! memory crate: stateless, full-history, windowed memory, and two-tier
//! memory with a persisted long-term record.

pub mod agent;
pub mod error;
pub mod oneshot;
pub mod session;
pub mod settings;

pub use agent::{
    AgentMode, ConversationAgent, LongTermContext, MemoryAgent, StatefulAgent, StatelessAgent,
};
pub use error::CoreError;
pub use oneshot::{Completion, complete, stream_completion};
pub use session::{SessionState, TurnReport};
pub use settings::AgentSettings;
