//! Accumulated conversation transcript.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Ordered transcript of successful exchanges within one session.
///
/// The only way to grow a history is [`push_exchange`](Self::push_exchange),
/// which appends the user prompt and the assistant reply together, so the
/// length is always even.
///
/// # Examples
///
/// ```
/// use colloquy_core::{ConversationHistory, Message};
///
/// let mut history = ConversationHistory::new();
/// history.push_exchange("Hi", "Hello there");
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.exchange_count(), 1);
/// assert_eq!(history.messages()[1], Message::assistant("Hello there"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed exchange: (user, prompt) then (assistant, reply).
    pub fn push_exchange(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        self.messages.push(Message::user(prompt));
        self.messages.push(Message::assistant(reply));
    }

    /// Number of messages (twice the number of exchanges).
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no exchange has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of recorded exchanges.
    pub fn exchange_count(&self) -> usize {
        self.messages.len() / 2
    }

    /// The messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate over the messages in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Consume the history, returning its messages.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
