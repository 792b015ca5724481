//! Schema validation for Mnemos JSON5 configuration layers.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Expected shape of a leaf value.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    String,
    Bool,
    Integer,
    Number,
    OneOf(&'static [&'static str]),
}

const MODEL_FIELDS: &[(&str, FieldKind)] = &[
    ("provider", FieldKind::OneOf(&["openai", "openrouter"])),
    ("name", FieldKind::String),
    ("base_url", FieldKind::String),
    ("api_key_env", FieldKind::String),
    ("temperature", FieldKind::Number),
    ("timeout_secs", FieldKind::Integer),
];

const MEMORY_FIELDS: &[(&str, FieldKind)] = &[
    ("window_turns", FieldKind::Integer),
    ("summary_style", FieldKind::OneOf(&["bullets", "json", "tldr"])),
    ("summary_message_chars", FieldKind::Integer),
    ("extraction_message_chars", FieldKind::Integer),
    ("max_facts", FieldKind::Integer),
    ("max_preferences", FieldKind::Integer),
    ("max_item_chars", FieldKind::Integer),
    ("redact_secrets", FieldKind::Bool),
    ("secret_entropy_threshold", FieldKind::Number),
    ("path", FieldKind::String),
];

const SESSION_FIELDS: &[(&str, FieldKind)] = &[
    ("exit_command", FieldKind::String),
    ("preview_chars", FieldKind::Integer),
];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    let sections: [(&str, &[(&str, FieldKind)]); 3] = [
        ("model", MODEL_FIELDS),
        ("memory", MEMORY_FIELDS),
        ("session", SESSION_FIELDS),
    ];
    for key in map.keys() {
        if key != "$schema" && !sections.iter().any(|(name, _)| *name == key.as_str()) {
            return Err(invalid_field(layer, key, "unknown key"));
        }
    }
    if let Some(value) = map.get("$schema") {
        check_field(value, FieldKind::String, layer, "$schema")?;
    }
    for (name, fields) in sections {
        if let Some(value) = map.get(name) {
            validate_section(value, fields, layer, name)?;
        }
    }
    Ok(())
}

fn validate_section(
    value: &Value,
    fields: &[(&str, FieldKind)],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    for (key, value) in map {
        let field_path = format!("{path}.{key}");
        let Some((_, kind)) = fields.iter().find(|(name, _)| *name == key.as_str()) else {
            return Err(invalid_field(layer, &field_path, "unknown key"));
        };
        check_field(value, *kind, layer, &field_path)?;
    }
    Ok(())
}

fn check_field(value: &Value, kind: FieldKind, layer: &str, path: &str) -> Result<(), ConfigError> {
    let ok = match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Integer => value.is_u64(),
        FieldKind::Number => value.is_number(),
        FieldKind::OneOf(options) => {
            let Some(text) = value.as_str() else {
                return Err(invalid_field(layer, path, "expected string"));
            };
            if !options.contains(&text) {
                let message = format!("expected one of {}", options.join(", "));
                return Err(invalid_field(layer, path, &message));
            }
            true
        }
    };
    if ok {
        Ok(())
    } else {
        let expected = match kind {
            FieldKind::String | FieldKind::OneOf(_) => "expected string",
            FieldKind::Bool => "expected bool",
            FieldKind::Integer => "expected non-negative integer",
            FieldKind::Number => "expected number",
        };
        Err(invalid_field(layer, path, expected))
    }
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
