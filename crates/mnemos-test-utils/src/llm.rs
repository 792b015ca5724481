use async_trait::async_trait;
use futures_util::stream;
use mnemos_llm::{ChatProvider, ChatRequest, ChatResponse, ChatStream, LlmError, Usage};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Usage reported by every mock reply.
pub const MOCK_USAGE: Usage = Usage {
    prompt_tokens: 10,
    completion_tokens: 5,
};

#[derive(Debug, Clone)]
pub struct FixedLLM {
    response: String,
}

impl FixedLLM {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for FixedLLM {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse::new(self.response.clone(), MOCK_USAGE))
    }
}

/// Replies from a queue in order and records every request it sees.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLLM {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    pub requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedLLM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let llm = Self::new();
        for reply in replies {
            llm.push_reply(reply);
        }
        llm
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies.lock().push_back(Err(message.into()));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ChatProvider for ScriptedLLM {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().push(request.clone());
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Ok(content)) => Ok(ChatResponse::new(content, MOCK_USAGE)),
            Some(Err(message)) => Err(LlmError::Provider(message)),
            None => Err(LlmError::Provider("script exhausted".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamingLLM {
    chunks: Vec<String>,
}

impl StreamingLLM {
    pub fn new(chunks: Vec<String>) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl ChatProvider for StreamingLLM {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse::new(self.chunks.join(""), MOCK_USAGE))
    }

    async fn chat_stream(&self, _request: &ChatRequest) -> Result<ChatStream, LlmError> {
        let chunks = self.chunks.iter().cloned().map(Ok).collect::<Vec<_>>();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[derive(Debug, Clone)]
pub struct FailingLLM {
    message: String,
}

impl FailingLLM {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for FailingLLM {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        Err(LlmError::Provider(self.message.clone()))
    }
}
