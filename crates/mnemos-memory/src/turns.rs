//! Turn store and window selection.
//!
//! A turn is one user message optionally followed by an assistant reply.
//! Boundaries are found by counting user messages from the end, so stores
//! that do not strictly alternate still split on a user message.

use mnemos_llm::Message;

/// Partition of a message sequence; `older ++ recent` is the whole input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSplit<'a> {
    /// Prefix eligible for compression.
    pub older: &'a [Message],
    /// Suffix kept verbatim.
    pub recent: &'a [Message],
}

/// Split `messages` so that `recent` starts at the `window_turns`-th user
/// message counted from the end.
///
/// A zero window puts everything in `older`. With fewer than `window_turns`
/// user messages everything stays in `recent`.
pub fn select_window(messages: &[Message], window_turns: usize) -> WindowSplit<'_> {
    let (older, recent) = messages.split_at(window_start(messages, window_turns));
    WindowSplit { older, recent }
}

/// Index where the recent window begins.
fn window_start(messages: &[Message], window_turns: usize) -> usize {
    if window_turns == 0 {
        return messages.len();
    }
    let mut users = 0;
    for (index, message) in messages.iter().enumerate().rev() {
        if message.is_user() {
            users += 1;
            if users == window_turns {
                return index;
            }
        }
    }
    0
}

/// Ordered messages of the active session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnStore {
    messages: Vec<Message>,
}

impl TurnStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of user messages, i.e. turns started.
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|message| message.is_user()).count()
    }

    /// Partition the store for the given window.
    pub fn split(&self, window_turns: usize) -> WindowSplit<'_> {
        select_window(&self.messages, window_turns)
    }

    /// Drop the oldest `count` messages, returning them in order.
    pub fn discard_oldest(&mut self, count: usize) -> Vec<Message> {
        let count = count.min(self.messages.len());
        self.messages.drain(..count).collect()
    }

    /// Remove the trailing message if it is an unanswered user message.
    pub fn pop_pending_user(&mut self) -> Option<Message> {
        if self.messages.last().is_some_and(Message::is_user) {
            self.messages.pop()
        } else {
            None
        }
    }
}
