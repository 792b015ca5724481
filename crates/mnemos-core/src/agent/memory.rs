//! Windowed memory agent with an optional long-term tier.

use super::{AgentMode, ConversationAgent};
use crate::error::CoreError;
use crate::session::{SessionState, TurnReport};
use crate::settings::AgentSettings;
use async_trait::async_trait;
use log::{debug, info, warn};
use mnemos_llm::{ChatProvider, ChatRequest};
use mnemos_memory::{
    Extractor, LongTermRecord, LongTermStore, PromptAssembler, Summarizer, normalize_identity,
};
use std::sync::Arc;
use std::time::Instant;

/// Long-term tier of a memory agent: whose record, where it lives, and
/// the copy loaded at session start.
pub struct LongTermContext {
    identity: String,
    store: Arc<dyn LongTermStore>,
    extractor: Extractor,
    record: LongTermRecord,
}

impl LongTermContext {
    /// Load the record for `identity` from `store`.
    pub async fn load(
        llm: Arc<dyn ChatProvider>,
        settings: &AgentSettings,
        store: Arc<dyn LongTermStore>,
        identity: &str,
    ) -> Result<Self, CoreError> {
        let identity = normalize_identity(identity);
        let record = store.load(&identity).await?;
        info!(
            "long-term memory loaded (identity={}, facts={}, preferences={})",
            identity,
            record.facts.len(),
            record.preferences.len()
        );
        let extractor = Extractor::new(llm, settings.model.clone())
            .with_policy(settings.extraction.clone());
        Ok(Self {
            identity,
            store,
            extractor,
            record,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn record(&self) -> &LongTermRecord {
        &self.record
    }
}

/// Keeps the last `window_turns` user turns verbatim and folds everything
/// older into a rolling digest.
pub struct MemoryAgent {
    llm: Arc<dyn ChatProvider>,
    settings: AgentSettings,
    summarizer: Summarizer,
    assembler: PromptAssembler,
    long_term: Option<LongTermContext>,
    state: SessionState,
}

impl MemoryAgent {
    pub fn new(llm: Arc<dyn ChatProvider>, settings: AgentSettings) -> Self {
        let summarizer = Summarizer::new(
            llm.clone(),
            settings.model.clone(),
            settings.digest_style,
        )
        .with_message_chars(settings.summary_message_chars);
        Self {
            llm,
            settings,
            summarizer,
            assembler: PromptAssembler::default(),
            long_term: None,
            state: SessionState::new(),
        }
    }

    pub fn with_long_term(mut self, context: LongTermContext) -> Self {
        self.long_term = Some(context);
        self
    }

    pub fn long_term(&self) -> Option<&LongTermContext> {
        self.long_term.as_ref()
    }

    /// Fold messages beyond the window into the digest. Returns whether the
    /// store was compressed. A failed summary keeps the previous digest and
    /// leaves the store as is so the fold is retried next turn.
    async fn compress(&mut self) -> bool {
        let split = self.state.turns.split(self.settings.window_turns);
        if split.older.is_empty() {
            return false;
        }
        let folded = split.older.len();
        match self
            .summarizer
            .summarize(self.state.digest.as_ref(), split.older)
            .await
        {
            Ok(digest) => {
                self.state.digest = digest;
                self.state.turns.discard_oldest(folded);
                info!(
                    "memory compacted (session_id={}, removed={}, digest_chars={})",
                    self.state.id,
                    folded,
                    self.state.digest_chars()
                );
                true
            }
            Err(err) => {
                warn!(
                    "digest update failed; keeping previous digest (session_id={}, error={})",
                    self.state.id, err
                );
                false
            }
        }
    }
}

#[async_trait]
impl ConversationAgent for MemoryAgent {
    fn mode(&self) -> AgentMode {
        if self.long_term.is_some() {
            AgentMode::LongTerm
        } else {
            AgentMode::Memory
        }
    }

    fn session(&self) -> &SessionState {
        &self.state
    }

    async fn respond(&mut self, input: &str) -> Result<TurnReport, CoreError> {
        let started = Instant::now();
        self.state.begin_turn(input);
        let compressed = self.compress().await;

        let messages = self.state.turns.messages();
        let recent = &messages[..messages.len().saturating_sub(1)];
        let request_messages = self.assembler.assemble(
            self.long_term.as_ref().map(LongTermContext::record),
            self.state.digest.as_ref(),
            recent,
            input,
        );
        debug!(
            "sending turn (session_id={}, window_messages={}, compressed={})",
            self.state.id,
            recent.len(),
            compressed
        );
        let request = ChatRequest::new(self.settings.model.clone(), request_messages)
            .with_temperature(self.settings.temperature);
        let response = match self.llm.chat(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "chat turn failed; input rolled back (session_id={}, error={})",
                    self.state.id, err
                );
                self.state.rollback_turn();
                return Err(err.into());
            }
        };
        self.state.complete_turn(&response.content, response.usage);
        Ok(TurnReport {
            turn: self.state.turn_number,
            reply: response.content,
            elapsed: started.elapsed(),
            usage: response.usage,
            context_messages: self.state.turns.len(),
            digest_chars: self.state.digest_chars(),
            compressed,
        })
    }

    async fn finish(&mut self) -> Result<Option<LongTermRecord>, CoreError> {
        let Some(context) = self.long_term.as_mut() else {
            return Ok(None);
        };
        if self.state.transcript.is_empty() {
            debug!(
                "empty session; long-term memory unchanged (identity={})",
                context.identity
            );
            return Ok(None);
        }
        let merged = match context
            .extractor
            .extract(&self.state.transcript, &context.record)
            .await
        {
            Ok(merged) => merged,
            Err(err) => {
                warn!(
                    "extraction failed; keeping stored record (identity={}, error={})",
                    context.identity, err
                );
                return Ok(None);
            }
        };
        context.store.save(&context.identity, &merged).await?;
        context.record = merged.clone();
        Ok(Some(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryAgent;
    use crate::agent::{AgentMode, ConversationAgent};
    use crate::settings::AgentSettings;
    use mnemos_memory::Digest;
    use mnemos_test_utils::ScriptedLLM;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn settings(window_turns: usize) -> AgentSettings {
        AgentSettings::default().with_window_turns(window_turns)
    }

    #[tokio::test]
    async fn no_compression_inside_window() {
        let llm = Arc::new(ScriptedLLM::with_replies(["A1", "A2"]));
        let mut agent = MemoryAgent::new(llm.clone(), settings(2));
        agent.respond("U1").await.expect("turn");
        let report = agent.respond("U2").await.expect("turn");

        assert!(!report.compressed);
        assert_eq!(report.context_messages, 4);
        assert_eq!(llm.request_count(), 2);
        assert_eq!(agent.mode(), AgentMode::Memory);
    }

    #[tokio::test]
    async fn failed_summary_keeps_digest_and_retries() {
        let llm = Arc::new(ScriptedLLM::with_replies(["A1"]));
        llm.push_failure("summary down");
        llm.push_reply("A2");
        llm.push_reply("- User said U1");
        llm.push_reply("A3");
        let mut agent = MemoryAgent::new(llm.clone(), settings(1));

        agent.respond("U1").await.expect("turn");
        let second = agent.respond("U2").await.expect("turn despite summary failure");
        assert!(!second.compressed);
        assert_eq!(agent.session().digest, None);
        assert_eq!(agent.session().turns.len(), 4);

        let third = agent.respond("U3").await.expect("turn");
        assert!(third.compressed);
        assert_eq!(
            agent.session().digest,
            Some(Digest::Bullets(vec!["User said U1".to_string()]))
        );
        assert_eq!(agent.session().turns.len(), 2);
    }

    #[tokio::test]
    async fn chat_failure_rolls_back_pending_input() {
        let llm = Arc::new(ScriptedLLM::with_replies(["A1"]));
        llm.push_failure("offline");
        let mut agent = MemoryAgent::new(llm, settings(4));
        agent.respond("U1").await.expect("turn");
        assert!(agent.respond("U2").await.is_err());
        assert_eq!(agent.session().transcript.len(), 2);
        assert_eq!(agent.session().turns.len(), 2);
        assert_eq!(agent.session().turn_number, 1);
    }

    #[tokio::test]
    async fn finish_without_long_term_is_a_no_op() {
        let llm = Arc::new(ScriptedLLM::with_replies(["A1"]));
        let mut agent = MemoryAgent::new(llm.clone(), settings(2));
        agent.respond("U1").await.expect("turn");
        assert_eq!(agent.finish().await.expect("finish"), None);
        assert_eq!(llm.request_count(), 1);
    }
}
