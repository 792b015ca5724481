//! Text helpers for views shown to the collaborator and for untrusted output.

use mnemos_llm::Message;
use regex::Regex;

/// Truncate a string to a maximum character count.
pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect()
}

/// Keep at most `max_words` whitespace-separated words, collapsing whitespace.
pub(crate) fn clamp_words(value: &str, max_words: usize) -> String {
    value
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render messages as `Role: content` lines, each body truncated.
pub(crate) fn render_transcript(messages: &[Message], max_chars: usize) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "{}: {}",
                message.role().label(),
                truncate_chars(message.content(), max_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip a surrounding markdown code fence, if any.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Ok(regex) = Regex::new(r"(?s)^```[A-Za-z0-9_-]*\s*(.*?)\s*```$") else {
        return trimmed;
    };
    regex
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str())
}

/// Comparison key for de-duplicating memory items.
pub(crate) fn item_key(item: &str) -> String {
    clamp_words(item, usize::MAX)
        .trim_end_matches(['.', '!', ';'])
        .to_lowercase()
}

/// Redact high-entropy tokens that resemble secrets.
pub(crate) fn redact_high_entropy(content: &str, threshold: f32, replacement: &str) -> String {
    let Ok(regex) = Regex::new(r"[A-Za-z0-9+/=_-]{20,}") else {
        return content.to_string();
    };
    regex
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let token = caps.get(0).map_or("", |m| m.as_str());
            if shannon_entropy(token) >= threshold {
                replacement.to_string()
            } else {
                token.to_string()
            }
        })
        .to_string()
}

/// Calculate Shannon entropy for a token string.
fn shannon_entropy(token: &str) -> f32 {
    let mut counts = [0usize; 256];
    let bytes = token.as_bytes();
    if bytes.is_empty() {
        return 0.0;
    }
    for byte in bytes {
        counts[*byte as usize] += 1;
    }
    let len = bytes.len() as f32;
    let mut entropy = 0.0;
    for count in counts.iter().copied().filter(|count| *count > 0) {
        let p = count as f32 / len;
        entropy -= p * p.log2();
    }
    entropy
}
