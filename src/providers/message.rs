//! Chat message types for LLM API interactions.
//!
//! Serializes to the OpenAI-style `{"role": ..., "content": ...}` shape that
//! chat completion endpoints accept directly.

use serde::{Deserialize, Serialize};

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    /// Instructions framing the conversation.
    System,
    /// Message from the user/human.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatMessageRole,
    pub(crate) content: String,
}

impl ChatMessage {
    pub fn system<S: ToString>(content: S) -> ChatMessage {
        ChatMessage {
            role: ChatMessageRole::System,
            content: content.to_string(),
        }
    }

    pub fn user<S: ToString>(content: S) -> ChatMessage {
        ChatMessage {
            role: ChatMessageRole::User,
            content: content.to_string(),
        }
    }

    /// Get the content of the message.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the role of the message.
    pub fn role(&self) -> ChatMessageRole {
        self.role
    }
}
