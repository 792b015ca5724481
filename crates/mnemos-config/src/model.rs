//! Configuration schema for models, memory, and interactive sessions.

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for Mnemos agents.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MnemosConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Hosted API flavour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    OpenRouter,
}

impl ProviderKind {
    /// Default API base URL.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Environment variable holding the API key.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

/// Completion collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Sampling temperature for chat turns.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request ceiling in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            name: default_model_name(),
            base_url: None,
            api_key_env: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Base URL, falling back to the provider default.
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Name of the environment variable holding the API key.
    pub fn resolved_api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_key_env())
    }
}

fn default_model_name() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

/// Output shape of the short-term digest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    #[default]
    Bullets,
    Json,
    Tldr,
}

/// Short-term and long-term memory settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    /// Recent turns kept verbatim.
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,
    #[serde(default)]
    pub summary_style: SummaryStyle,
    /// Per-message character budget shown to the summarizer.
    #[serde(default = "default_summary_message_chars")]
    pub summary_message_chars: usize,
    /// Per-message character budget shown to the extractor.
    #[serde(default = "default_extraction_message_chars")]
    pub extraction_message_chars: usize,
    #[serde(default = "default_max_items")]
    pub max_facts: usize,
    #[serde(default = "default_max_items")]
    pub max_preferences: usize,
    #[serde(default = "default_max_item_chars")]
    pub max_item_chars: usize,
    /// Redact high-entropy tokens before persisting long-term items.
    #[serde(default = "default_redact_secrets")]
    pub redact_secrets: bool,
    #[serde(default = "default_secret_entropy_threshold")]
    pub secret_entropy_threshold: f32,
    /// Long-term memory file; defaults to `~/.mnemos/user_memories.json`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_turns: default_window_turns(),
            summary_style: SummaryStyle::default(),
            summary_message_chars: default_summary_message_chars(),
            extraction_message_chars: default_extraction_message_chars(),
            max_facts: default_max_items(),
            max_preferences: default_max_items(),
            max_item_chars: default_max_item_chars(),
            redact_secrets: default_redact_secrets(),
            secret_entropy_threshold: default_secret_entropy_threshold(),
            path: None,
        }
    }
}

impl MemoryConfig {
    /// Resolve the long-term memory file location.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = self.path.as_ref() {
            return PathBuf::from(path);
        }
        UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".mnemos"))
            .unwrap_or_else(|| PathBuf::from(".mnemos"))
            .join(DEFAULT_MEMORY_FILE)
    }
}

/// Default long-term memory filename.
pub const DEFAULT_MEMORY_FILE: &str = "user_memories.json";

fn default_window_turns() -> usize {
    6
}

fn default_summary_message_chars() -> usize {
    500
}

fn default_extraction_message_chars() -> usize {
    300
}

fn default_max_items() -> usize {
    10
}

fn default_max_item_chars() -> usize {
    200
}

fn default_redact_secrets() -> bool {
    true
}

fn default_secret_entropy_threshold() -> f32 {
    3.7
}

/// Interactive session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Input that ends the session (case-insensitive).
    #[serde(default = "default_exit_command")]
    pub exit_command: String,
    /// Characters of the digest echoed after each turn; 0 disables.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exit_command: default_exit_command(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_exit_command() -> String {
    "exit".to_string()
}

fn default_preview_chars() -> usize {
    300
}
