//! Error types for completion providers.

/// Errors returned by chat providers.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport failure, including timeouts.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response carried no assistant content.
    #[error("provider returned no content")]
    EmptyResponse,
    /// Provider reported an error in the middle of a stream.
    #[error("stream error: {0}")]
    Stream(String),
    /// Generic provider failure.
    #[error("provider error: {0}")]
    Provider(String),
}
