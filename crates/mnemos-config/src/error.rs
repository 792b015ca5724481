//! Config errors.

use thiserror::Error;

/// Why a config layer could not become a usable `MnemosConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config layer could not be read from disk.
    #[error("cannot read config layer: {0}")]
    Io(#[from] std::io::Error),
    /// A config layer is not valid JSON5.
    #[error("config layer is not valid JSON5: {0}")]
    Syntax(#[from] json5::Error),
    /// The merged layers do not match the config model.
    #[error("config does not match the expected model: {0}")]
    Shape(#[from] serde_json::Error),
    /// A field holds a value Mnemos cannot run with.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
}
