//! Error types for the core agent crate.

use mnemos_llm::LlmError;
use mnemos_memory::MemoryError;
use thiserror::Error;

/// Errors returned by agent operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The completion collaborator failed during a chat turn.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] LlmError),
    /// Long-term store or memory pipeline error.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
}
