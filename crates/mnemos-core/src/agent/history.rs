//! Agents without compression: stateless and full history.

use super::{AgentMode, ConversationAgent};
use crate::error::CoreError;
use crate::session::{SessionState, TurnReport};
use crate::settings::AgentSettings;
use async_trait::async_trait;
use log::{info, warn};
use mnemos_llm::{ChatProvider, ChatRequest, Message};
use std::sync::Arc;
use std::time::Instant;

/// Sends each input on its own; the model sees no earlier turns.
pub struct StatelessAgent {
    llm: Arc<dyn ChatProvider>,
    settings: AgentSettings,
    state: SessionState,
}

impl StatelessAgent {
    pub fn new(llm: Arc<dyn ChatProvider>, settings: AgentSettings) -> Self {
        Self {
            llm,
            settings,
            state: SessionState::new(),
        }
    }
}

#[async_trait]
impl ConversationAgent for StatelessAgent {
    fn mode(&self) -> AgentMode {
        AgentMode::Stateless
    }

    fn session(&self) -> &SessionState {
        &self.state
    }

    async fn respond(&mut self, input: &str) -> Result<TurnReport, CoreError> {
        let started = Instant::now();
        let request = ChatRequest::new(self.settings.model.clone(), vec![Message::user(input)])
            .with_temperature(self.settings.temperature);
        let response = self.llm.chat(&request).await?;
        self.state.transcript.push(Message::user(input));
        self.state.transcript.push(Message::assistant(&response.content));
        self.state.turn_number += 1;
        self.state.input_tokens += response.usage.prompt_tokens;
        self.state.output_tokens += response.usage.completion_tokens;
        Ok(TurnReport {
            turn: self.state.turn_number,
            reply: response.content,
            elapsed: started.elapsed(),
            usage: response.usage,
            context_messages: 1,
            digest_chars: 0,
            compressed: false,
        })
    }
}

/// Sends the whole conversation every turn.
pub struct StatefulAgent {
    llm: Arc<dyn ChatProvider>,
    settings: AgentSettings,
    state: SessionState,
}

impl StatefulAgent {
    pub fn new(llm: Arc<dyn ChatProvider>, settings: AgentSettings) -> Self {
        Self {
            llm,
            settings,
            state: SessionState::new(),
        }
    }
}

#[async_trait]
impl ConversationAgent for StatefulAgent {
    fn mode(&self) -> AgentMode {
        AgentMode::Stateful
    }

    fn session(&self) -> &SessionState {
        &self.state
    }

    async fn respond(&mut self, input: &str) -> Result<TurnReport, CoreError> {
        let started = Instant::now();
        self.state.begin_turn(input);
        let request = ChatRequest::new(
            self.settings.model.clone(),
            self.state.turns.messages().to_vec(),
        )
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
        info!(
            "turn completed (session_id={}, turn={}, history={}, input_tokens_total={})",
            self.state.id,
            self.state.turn_number,
            self.state.turns.len(),
            self.state.input_tokens
        );
        Ok(TurnReport {
            turn: self.state.turn_number,
            reply: response.content,
            elapsed: started.elapsed(),
            usage: response.usage,
            context_messages: self.state.turns.len(),
            digest_chars: 0,
            compressed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{StatefulAgent, StatelessAgent};
    use crate::agent::ConversationAgent;
    use crate::settings::AgentSettings;
    use mnemos_llm::Message;
    use mnemos_test_utils::ScriptedLLM;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn stateless_sends_only_current_input() {
        let llm = Arc::new(ScriptedLLM::with_replies(["hi Ana", "I don't know"]));
        let mut agent = StatelessAgent::new(llm.clone(), AgentSettings::default());
        agent.respond("I'm Ana").await.expect("turn");
        let report = agent.respond("What's my name?").await.expect("turn");

        assert_eq!(report.context_messages, 1);
        assert_eq!(
            llm.last_request().expect("request").messages,
            vec![Message::user("What's my name?")]
        );
        assert_eq!(agent.session().transcript.len(), 4);
    }

    #[tokio::test]
    async fn stateful_sends_history_and_accumulates_tokens() {
        let llm = Arc::new(ScriptedLLM::with_replies(["hi Ana", "You are Ana"]));
        let mut agent = StatefulAgent::new(llm.clone(), AgentSettings::default());
        agent.respond("I'm Ana").await.expect("turn");
        let report = agent.respond("What's my name?").await.expect("turn");

        assert_eq!(report.context_messages, 4);
        assert_eq!(agent.session().input_tokens, 20);
        assert_eq!(
            llm.last_request().expect("request").messages,
            vec![
                Message::user("I'm Ana"),
                Message::assistant("hi Ana"),
                Message::user("What's my name?"),
            ]
        );
    }

    #[tokio::test]
    async fn stateful_failure_rolls_back_input() {
        let llm = Arc::new(ScriptedLLM::with_replies(["hi"]));
        llm.push_failure("rate limited");
        let mut agent = StatefulAgent::new(llm, AgentSettings::default());
        agent.respond("one").await.expect("turn");
        assert!(agent.respond("two").await.is_err());
        assert_eq!(agent.session().turns.len(), 2);
        assert_eq!(agent.session().transcript.len(), 2);
    }
}
