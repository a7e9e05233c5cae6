//! Chat transcript as shown to the user.

use crate::agent_loop::GREETING;
use crate::types::{ModelMessage, Role};

/// Visible conversation: the greeting, user prompts and final answers.
///
/// Intermediate tool traffic is never stored here.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A fresh conversation holding only the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ModelMessage::assistant(GREETING)],
        }
    }

    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::user(text));
    }

    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::assistant(text));
    }

    /// Drop the last message if it is a user prompt.
    pub(crate) fn pop_user_message(&mut self) -> Option<ModelMessage> {
        match self.messages.last() {
            Some(m) if m.role == Role::User => self.messages.pop(),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Back to just the greeting.
    pub fn clear(&mut self) {
        self.messages = vec![ModelMessage::assistant(GREETING)];
    }
}
