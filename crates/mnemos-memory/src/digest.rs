//! Digest styles and parsing of collaborator output into bounded digests.

use crate::error::MemoryError;
use crate::text::{clamp_words, strip_code_fence};
use serde::{Deserialize, Serialize};

/// Maximum bullets kept in a bullet digest.
pub const MAX_BULLETS: usize = 10;
/// Maximum items per list in a structured digest.
pub const MAX_STRUCTURED_ITEMS: usize = 5;
/// Maximum words per structured item.
pub const MAX_ITEM_WORDS: usize = 15;
/// Maximum words in a paragraph digest.
pub const MAX_TLDR_WORDS: usize = 60;

/// Shape the rolling digest takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestStyle {
    /// Short bullet list.
    #[default]
    Bullets,
    /// JSON object with facts, preferences, goals, and decisions.
    Json,
    /// Single short paragraph.
    Tldr,
}

impl DigestStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestStyle::Bullets => "bullets",
            DigestStyle::Json => "json",
            DigestStyle::Tldr => "tldr",
        }
    }

    /// System instructions for the summarization request.
    pub(crate) fn instructions(&self) -> &'static str {
        match self {
            DigestStyle::Bullets => {
                "You maintain a running memory of a conversation.\n\
                 Merge the existing memory with the new turns and write at most 10 short bullet points, one per line, each starting with \"- \".\n\
                 Focus on facts about the user, preferences, goals, decisions, and commitments.\n\
                 If something is corrected later, reflect the latest info.\n\
                 Output only the bullet list."
            }
            DigestStyle::Json => {
                "You maintain a running memory of a conversation.\n\
                 Merge the existing memory with the new turns and return a JSON object with exactly these keys: \
                 \"facts\", \"preferences\", \"goals\", \"decisions\".\n\
                 Each value is a list of at most 5 strings and each string is under 15 words.\n\
                 If something is corrected later, keep only the latest info.\n\
                 Output only the JSON object."
            }
            DigestStyle::Tldr => {
                "You maintain a running memory of a conversation.\n\
                 Merge the existing memory with the new turns into one TL;DR paragraph of at most 60 words.\n\
                 Keep the facts, preferences, goals, and decisions that matter for the rest of the conversation.\n\
                 If something is corrected later, reflect the latest info.\n\
                 Output only the paragraph."
            }
        }
    }
}

impl std::fmt::Display for DigestStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured digest lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDigest {
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub decisions: Vec<String>,
}

impl StructuredDigest {
    fn clamp(self) -> Self {
        Self {
            facts: clamp_items(self.facts),
            preferences: clamp_items(self.preferences),
            goals: clamp_items(self.goals),
            decisions: clamp_items(self.decisions),
        }
    }

    fn is_empty(&self) -> bool {
        self.facts.is_empty()
            && self.preferences.is_empty()
            && self.goals.is_empty()
            && self.decisions.is_empty()
    }
}

fn clamp_items(items: Vec<String>) -> Vec<String> {
    items
        .iter()
        .map(|item| clamp_words(item, MAX_ITEM_WORDS))
        .filter(|item| !item.is_empty())
        .take(MAX_STRUCTURED_ITEMS)
        .collect()
}

/// Compressed representation of the messages that left the recent window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digest {
    Bullets(Vec<String>),
    Structured(StructuredDigest),
    Paragraph(String),
}

impl Digest {
    /// Parse raw collaborator output for `style`, enforcing its size bounds.
    ///
    /// Output that is empty or does not match the style is rejected so the
    /// caller can keep its previous digest.
    pub fn parse(style: DigestStyle, raw: &str) -> Result<Self, MemoryError> {
        let digest = match style {
            DigestStyle::Bullets => {
                let bullets: Vec<String> = strip_code_fence(raw)
                    .lines()
                    .map(strip_bullet)
                    .filter(|line| !line.is_empty())
                    .take(MAX_BULLETS)
                    .collect();
                if bullets.is_empty() {
                    return Err(MemoryError::InvalidOutput("empty bullet digest".to_string()));
                }
                Digest::Bullets(bullets)
            }
            DigestStyle::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(strip_code_fence(raw)).map_err(|err| {
                        MemoryError::InvalidOutput(format!("digest is not JSON: {err}"))
                    })?;
                if !value.is_object() {
                    return Err(MemoryError::InvalidOutput(
                        "digest is not a JSON object".to_string(),
                    ));
                }
                let structured: StructuredDigest = serde_json::from_value(value).map_err(|err| {
                    MemoryError::InvalidOutput(format!("digest has unexpected shape: {err}"))
                })?;
                Digest::Structured(structured.clamp())
            }
            DigestStyle::Tldr => {
                let paragraph = clamp_words(strip_code_fence(raw), MAX_TLDR_WORDS);
                if paragraph.is_empty() {
                    return Err(MemoryError::InvalidOutput("empty tldr digest".to_string()));
                }
                Digest::Paragraph(paragraph)
            }
        };
        Ok(digest)
    }

    pub fn style(&self) -> DigestStyle {
        match self {
            Digest::Bullets(_) => DigestStyle::Bullets,
            Digest::Structured(_) => DigestStyle::Json,
            Digest::Paragraph(_) => DigestStyle::Tldr,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Digest::Bullets(bullets) => bullets.is_empty(),
            Digest::Structured(structured) => structured.is_empty(),
            Digest::Paragraph(text) => text.trim().is_empty(),
        }
    }

    /// Text form used in prompts and previews.
    pub fn render(&self) -> String {
        match self {
            Digest::Bullets(bullets) => bullets
                .iter()
                .map(|bullet| format!("- {bullet}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Digest::Structured(structured) => {
                serde_json::to_string_pretty(structured).unwrap_or_default()
            }
            Digest::Paragraph(text) => text.clone(),
        }
    }
}

fn strip_bullet(line: &str) -> String {
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .unwrap_or(line);
    let numbered = line
        .split_once(". ")
        .filter(|(prefix, _)| !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()));
    match numbered {
        Some((_, rest)) => rest.trim().to_string(),
        None => line.trim().to_string(),
    }
}
