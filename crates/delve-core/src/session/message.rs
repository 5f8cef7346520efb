//! Conversation message types.
//!
//! Messages are owned by the streaming collaborator; the core only relies on
//! their id, their role and their position in the list.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Represents the author of a message.
///
/// On the wire assistant messages are typed `"ai"`; `"assistant"` is accepted
/// as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message typed by the user.
    #[serde(rename = "human", alias = "user")]
    Human,
    /// Message produced by the research assistant.
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

/// Message body: plain text or a structured JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(Value),
}

impl MessageContent {
    /// Text shown in a bubble and copied to the clipboard.
    ///
    /// Structured payloads are pretty-printed JSON.
    pub fn to_display_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Client-assigned for user messages, backend-assigned for assistant messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    /// Creates a user message with a fresh client-side id.
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            role: MessageRole::Human,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(id: Option<String>, content: impl Into<MessageContent>) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    pub fn is_human(&self) -> bool {
        self.role == MessageRole::Human
    }
}
