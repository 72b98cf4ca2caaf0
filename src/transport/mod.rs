//! Where chat messages come from and where replies go.

mod console;
mod scripted;

pub use console::ConsoleTransport;
pub use scripted::ScriptedTransport;

use crate::commands::Outcome;
use anyhow::Result;
use async_trait::async_trait;

/// A chat message as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub channel: String,
    pub author: String,
    pub content: String,
}

impl IncomingMessage {
    pub fn new(channel: impl Into<String>, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            author: author.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send {
    /// Next message to handle. `None` once the source is exhausted.
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>>;

    /// Carry out an outcome in `channel`. `invocation` is the message that
    /// triggered it, if any.
    async fn deliver(
        &mut self,
        channel: &str,
        invocation: Option<&IncomingMessage>,
        outcome: &Outcome,
    ) -> Result<()>;
}
