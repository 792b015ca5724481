//! Long-term memory record for one identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable facts and preferences remembered across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermRecord {
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    /// Time of the last merge that produced this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LongTermRecord {
    pub fn new(facts: Vec<String>, preferences: Vec<String>) -> Self {
        Self {
            facts,
            preferences,
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.preferences.is_empty()
    }

    /// Prompt rendering; empty when the record holds nothing.
    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        if !self.facts.is_empty() {
            sections.push(format!("Facts about this user:\n{}", bullet_list(&self.facts)));
        }
        if !self.preferences.is_empty() {
            sections.push(format!(
                "User preferences:\n{}",
                bullet_list(&self.preferences)
            ));
        }
        sections.join("\n\n")
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
