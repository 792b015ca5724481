//! Runtime settings derived from configuration.

use mnemos_config::{MnemosConfig, SummaryStyle};
use mnemos_memory::{DigestStyle, ExtractionPolicy};

/// Everything an agent needs from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    /// User turns kept verbatim in the recent window.
    pub window_turns: usize,
    pub digest_style: DigestStyle,
    pub summary_message_chars: usize,
    pub extraction: ExtractionPolicy,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&MnemosConfig::default())
    }
}

impl AgentSettings {
    /// Translate loaded configuration into runtime settings.
    pub fn from_config(config: &MnemosConfig) -> Self {
        let memory = &config.memory;
        Self {
            model: config.model.name.clone(),
            temperature: config.model.temperature,
            window_turns: memory.window_turns,
            digest_style: digest_style_from_config(memory.summary_style),
            summary_message_chars: memory.summary_message_chars,
            extraction: ExtractionPolicy {
                max_facts: memory.max_facts,
                max_preferences: memory.max_preferences,
                max_item_chars: memory.max_item_chars,
                message_chars: memory.extraction_message_chars,
                redact_secrets: memory.redact_secrets,
                secret_entropy_threshold: memory.secret_entropy_threshold,
                redaction_replacement: "[REDACTED]".to_string(),
            },
        }
    }

    pub fn with_window_turns(mut self, window_turns: usize) -> Self {
        self.window_turns = window_turns;
        self
    }

    pub fn with_digest_style(mut self, style: DigestStyle) -> Self {
        self.digest_style = style;
        self
    }
}

/// Map digest style from config to the memory crate enum.
pub fn digest_style_from_config(style: SummaryStyle) -> DigestStyle {
    match style {
        SummaryStyle::Bullets => DigestStyle::Bullets,
        SummaryStyle::Json => DigestStyle::Json,
        SummaryStyle::Tldr => DigestStyle::Tldr,
    }
}
