//! Command-line definitions.

use clap::{Parser, Subcommand, ValueEnum};
use mnemos::config::{MnemosConfig, SummaryStyle};
use std::path::PathBuf;

pub const DEFAULT_COMPLETE_PROMPT: &str = "Explain Software 3.0 in one sentence.";
pub const DEFAULT_STREAM_PROMPT: &str = "Write a haiku about APIs.";

/// Chat agents with short-term and long-term memory.
#[derive(Debug, Parser)]
#[command(name = "mnemos", version)]
pub struct Cli {
    /// Optional path to a mnemos.json5 config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Model name, overriding config and MNEMOS_MODEL
    #[arg(long, global = true)]
    pub model: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one prompt and print the reply
    Complete { prompt: Option<String> },
    /// Send one prompt and print the reply as it streams
    Stream { prompt: Option<String> },
    /// Chat without any memory of earlier turns
    Stateless,
    /// Chat sending the full history every turn
    Stateful,
    /// Chat with a recent window and a rolling digest
    Memory {
        /// User turns kept verbatim
        #[arg(long)]
        window: Option<usize>,
        /// Digest style
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },
    /// Chat with short-term memory plus a persisted per-user record
    LongTerm {
        /// User turns kept verbatim
        #[arg(long)]
        window: Option<usize>,
        /// Long-term memory file
        #[arg(long)]
        memory_file: Option<PathBuf>,
        /// Identity to load; prompted for when absent
        #[arg(long)]
        user: Option<String>,
    },
    /// Inspect or edit persisted long-term memory
    Memories {
        /// Long-term memory file
        #[arg(long)]
        memory_file: Option<PathBuf>,
        #[command(subcommand)]
        command: MemoriesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum MemoriesCommand {
    /// Print the record stored for a user
    Show { name: String },
    /// Delete the record stored for a user
    Forget { name: String },
    /// List stored users
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Bullets,
    Json,
    Tldr,
}

impl From<StyleArg> for SummaryStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Bullets => SummaryStyle::Bullets,
            StyleArg::Json => SummaryStyle::Json,
            StyleArg::Tldr => SummaryStyle::Tldr,
        }
    }
}

/// Apply memory-related flags on top of the loaded config.
pub fn apply_memory_overrides(
    config: &mut MnemosConfig,
    window: Option<usize>,
    style: Option<StyleArg>,
    memory_file: Option<&PathBuf>,
) {
    if let Some(window) = window {
        config.memory.window_turns = window;
    }
    if let Some(style) = style {
        config.memory.summary_style = style.into();
    }
    if let Some(path) = memory_file {
        config.memory.path = Some(path.to_string_lossy().to_string());
    }
}
