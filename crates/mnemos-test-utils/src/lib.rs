//! Test helpers shared across Mnemos crates.

pub mod llm;

pub use llm::{FailingLLM, FixedLLM, ScriptedLLM, StreamingLLM};
