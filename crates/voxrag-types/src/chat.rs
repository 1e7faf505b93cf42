//! Conversation messages and the ordered per-session context.

use crate::ChatRole;
use serde::{Deserialize, Serialize};

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Text content of the message, as handed to retrieval queries.
    pub fn text_content(&self) -> &str {
        &self.content
    }
}

/// Ordered sequence of messages for one voice session.
///
/// Messages are only ever appended; order is the order the LLM sees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    messages: Vec<ChatMessage>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message built from `role` and `content`.
    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    /// Appends an already-built message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Returns the messages the LLM should see: `instructions` as a leading
    /// system message (when non-empty) followed by the context in order.
    pub fn with_instructions(&self, instructions: &str) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        if !instructions.is_empty() {
            out.push(ChatMessage::system(instructions));
        }
        out.extend(self.messages.iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_message_preserves_order() {
        let mut ctx = ChatContext::new();
        ctx.add_message(ChatRole::User, "first");
        ctx.add_message(ChatRole::Assistant, "second");
        ctx.push(ChatMessage::system("third"));

        let contents: Vec<&str> = ctx.messages().iter().map(|m| m.text_content()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(ctx.last().unwrap().role, ChatRole::System);
    }

    #[test]
    fn with_instructions_prepends_system_message() {
        let mut ctx = ChatContext::new();
        ctx.add_message(ChatRole::User, "hello");

        let messages = ctx.with_instructions("be brief");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("be brief"));
        assert_eq!(messages[1], ChatMessage::user("hello"));

        assert_eq!(ctx.with_instructions("").len(), 1);
    }
}
