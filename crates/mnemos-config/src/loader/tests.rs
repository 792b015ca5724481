//! Tests for layered configuration loading.

use super::*;
use crate::{ProviderKind, SummaryStyle};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write JSON5 contents to a path, creating parent directories if needed.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Verify that a minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = MnemosConfig::load_from_str("{}").expect("config");
    assert_eq!(config, MnemosConfig::default());
    assert_eq!(config.memory.window_turns, 6);
    assert_eq!(config.memory.summary_style, SummaryStyle::Bullets);
    assert_eq!(config.session.exit_command, "exit");
}

/// JSON5 syntax (comments, unquoted keys) is accepted.
#[test]
fn parse_json5_sections() {
    let json5 = r#"{
        // chat through OpenRouter
        model: { provider: "openrouter", name: "openai/gpt-4.1-mini", temperature: 0.2 },
        memory: { window_turns: 4, summary_style: "tldr", max_facts: 5 },
    }"#;
    let config = MnemosConfig::load_from_str(json5).expect("config");
    assert_eq!(config.model.provider, ProviderKind::OpenRouter);
    assert_eq!(
        config.model.resolved_base_url(),
        "https://openrouter.ai/api/v1"
    );
    assert_eq!(config.model.resolved_api_key_env(), "OPENROUTER_API_KEY");
    assert_eq!(config.memory.window_turns, 4);
    assert_eq!(config.memory.summary_style, SummaryStyle::Tldr);
    assert_eq!(config.memory.max_facts, 5);
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = MnemosConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

/// Reject unknown digest styles at load time.
#[test]
fn rejects_unknown_summary_style() {
    let err = MnemosConfig::load_from_str(r#"{ memory: { summary_style: "haiku" } }"#)
        .unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("memory.summary_style"));
    assert!(msg.contains("bullets"));
}

/// A zero-turn window is a configuration error.
#[test]
fn rejects_empty_window() {
    let err = MnemosConfig::load_from_str("{ memory: { window_turns: 0 } }").unwrap_err();
    assert!(format!("{err}").contains("memory.window_turns"));
}

/// Temperature outside the supported range is rejected.
#[test]
fn rejects_out_of_range_temperature() {
    let err = MnemosConfig::load_from_str("{ model: { temperature: 3.5 } }").unwrap_err();
    assert!(format!("{err}").contains("model.temperature"));
}

/// Wrongly typed fields report the offending path.
#[test]
fn rejects_wrong_field_type() {
    let err = MnemosConfig::load_from_str(r#"{ session: { preview_chars: "long" } }"#)
        .unwrap_err();
    assert!(format!("{err}").contains("session.preview_chars"));
}

/// Runtime layers override cwd layers, which override user layers.
#[test]
fn layered_config_precedence() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let cwd = root.join("work");
    fs::create_dir_all(&cwd).expect("cwd");

    let user_config = root.join("home").join(".mnemos").join("mnemos.json5");
    write_json5(
        &user_config,
        r#"{ model: { name: "user-model" }, memory: { window_turns: 3, max_facts: 7 } }"#,
    );
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ memory: { window_turns: 2 } }"#,
    );
    let runtime = root.join("override.json5");
    write_json5(&runtime, r#"{ model: { name: "runtime-model" } }"#);

    let options = LayeredConfigOptions {
        cwd: cwd.clone(),
        user_config_path: Some(user_config),
        runtime_paths: Vec::new(),
    }
    .with_runtime_path(&runtime);
    let layered = MnemosConfig::load_layered_with_options(options).expect("layered");

    assert_eq!(layered.layers.len(), 3);
    assert_eq!(layered.layers[2].source, ConfigLayerSource::Runtime);
    assert_eq!(layered.config.model.name, "runtime-model");
    assert_eq!(layered.config.memory.window_turns, 2);
    assert_eq!(layered.config.memory.max_facts, 7);
}

/// Missing optional layers are skipped; a missing runtime layer is an error.
#[test]
fn layered_config_missing_layers() {
    let temp = TempDir::new().expect("tmp");
    let options = LayeredConfigOptions {
        cwd: temp.path().to_path_buf(),
        user_config_path: Some(temp.path().join("absent.json5")),
        runtime_paths: Vec::new(),
    };
    let layered = MnemosConfig::load_layered_with_options(options.clone()).expect("layered");
    assert!(layered.layers.is_empty());
    assert_eq!(layered.config, MnemosConfig::default());

    let err = MnemosConfig::load_layered_with_options(
        options.with_runtime_path(temp.path().join("missing.json5")),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

/// Explicit memory path wins over the home default.
#[test]
fn memory_path_resolution() {
    let mut config = MnemosConfig::default();
    assert!(
        config
            .memory
            .resolved_path()
            .ends_with(crate::DEFAULT_MEMORY_FILE)
    );
    config.memory.path = Some("/tmp/mem.json".to_string());
    assert_eq!(
        config.memory.resolved_path(),
        std::path::PathBuf::from("/tmp/mem.json")
    );
}

/// A zero item budget would blank every stored item.
#[test]
fn rejects_zero_item_budget() {
    let err = MnemosConfig::load_from_str("{ memory: { max_item_chars: 0 } }").unwrap_err();
    assert!(format!("{err}").contains("memory.max_item_chars"));
}
