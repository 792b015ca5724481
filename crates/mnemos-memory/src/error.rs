//! Error types for memory operations.

use mnemos_llm::LlmError;

/// Errors returned by the summarizer, extractor, and long-term stores.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Completion collaborator failed.
    #[error("collaborator error: {0}")]
    Llm(#[from] LlmError),
    /// Collaborator output did not match the requested shape.
    #[error("invalid model output: {0}")]
    InvalidOutput(String),
}
