//! Message and Dialogue domain types.
//!
//! A dialogue is the caller-owned history of a voice session. The intent
//! pipeline reads a suffix window of it and, on a continue decision, strips
//! tool traffic out of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
    /// Tool execution result
    Tool,
    /// Legacy function-call result
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
            Role::Function => "function",
        }
    }

    /// Whether this role carries tool/function traffic rather than conversation.
    pub fn is_tool_traffic(&self) -> bool {
        matches!(self, Role::Tool | Role::Function)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn in a dialogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    #[serde(default = "new_id")]
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl Message {
    /// Create a message with an arbitrary role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a tool result message.
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// An ordered, caller-owned sequence of dialogue turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dialogue {
    /// Ordered messages, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Dialogue {
    /// Create a new empty dialogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the dialogue.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `count` messages, clipped to what is available.
    pub fn recent(&self, count: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    /// Drop tool and function turns, keeping the order of the rest.
    ///
    /// Returns how many turns were removed.
    pub fn retain_conversational(&mut self) -> usize {
        let before = self.messages.len();
        self.messages.retain(|m| !m.role.is_tool_traffic());
        before - self.messages.len()
    }
}

impl From<Vec<Message>> for Dialogue {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Turn on the kitchen light");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Turn on the kitchen light");
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn recent_clips_to_available_history() {
        let mut dialogue = Dialogue::new();
        dialogue.push(Message::user("one"));
        dialogue.push(Message::assistant("two"));

        assert_eq!(dialogue.recent(4).len(), 2);
        assert_eq!(dialogue.recent(1)[0].content, "two");
        assert!(dialogue.recent(0).is_empty());
    }

    #[test]
    fn retain_conversational_strips_tool_traffic_in_order() {
        let mut dialogue = Dialogue::from(vec![
            Message::user("u1"),
            Message::tool("t1"),
            Message::assistant("a1"),
            Message::new(Role::Function, "f1"),
            Message::user("u2"),
        ]);

        let removed = dialogue.retain_conversational();
        assert_eq!(removed, 2);
        let contents: Vec<&str> = dialogue.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["u1", "a1", "u2"]);
    }

    #[test]
    fn message_deserializes_without_id_or_timestamp() {
        let msg: Message = serde_json::from_str(r#"{"role":"function","content":"done"}"#).unwrap();
        assert_eq!(msg.role, Role::Function);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn role_display_is_lowercase() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::Tool.to_string(), "tool");
    }
}
