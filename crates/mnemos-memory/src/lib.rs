//! Conversation memory for Mnemos agents.
//!
//! Short-term memory is a verbatim window of recent turns plus a rolling
//! digest of everything older. Long-term memory is a per-identity record of
//! durable facts and preferences, extracted at session end and persisted to a
//! flat JSON file.

pub mod digest;
pub mod error;
pub mod extractor;
pub mod prompt;
pub mod record;
pub mod store;
pub mod summarizer;
mod text;
pub mod turns;

/// Digest styles and values.
pub use digest::{Digest, DigestStyle, StructuredDigest};
/// Memory error type.
pub use error::MemoryError;
/// Long-term extraction and merge policy.
pub use extractor::{ExtractedMemory, ExtractionPolicy, Extractor};
/// Message model re-exported from the collaborator crate.
pub use mnemos_llm::{Message, Role};
/// Prompt assembly.
pub use prompt::{DEFAULT_INSTRUCTIONS, PromptAssembler};
/// Long-term memory record.
pub use record::LongTermRecord;
/// Long-term store interface and default file implementation.
pub use store::{ANONYMOUS_IDENTITY, FileLongTermStore, LongTermStore, normalize_identity};
/// Digest summarizer.
pub use summarizer::{DEFAULT_SUMMARY_MESSAGE_CHARS, Summarizer};
/// Turn store and window selection.
pub use turns::{TurnStore, WindowSplit, select_window};
