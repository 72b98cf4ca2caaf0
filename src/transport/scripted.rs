use super::{IncomingMessage, Transport};
use crate::commands::Outcome;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// Vector-based transport for tests: replays fixed messages and records
/// every delivered outcome.
pub struct ScriptedTransport {
    inbox: std::vec::IntoIter<IncomingMessage>,
    delivered: Vec<(String, Outcome)>,
}

impl ScriptedTransport {
    /// Messages all arrive on the `test` channel.
    pub fn new<S: ToString>(lines: Vec<S>) -> Self {
        let inbox: Vec<_> = lines
            .into_iter()
            .map(|line| IncomingMessage::new("test", "tester", line.to_string()))
            .collect();
        Self::from_messages(inbox)
    }

    pub fn from_messages(messages: Vec<IncomingMessage>) -> Self {
        Self {
            inbox: messages.into_iter(),
            delivered: Vec::new(),
        }
    }

    /// Outcomes delivered so far, with their channel.
    pub fn delivered(&self) -> &[(String, Outcome)] {
        &self.delivered
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        let next = self.inbox.next();
        if next.is_none() {
            debug!("No more scripted messages available");
        }
        Ok(next)
    }

    async fn deliver(
        &mut self,
        channel: &str,
        _invocation: Option<&IncomingMessage>,
        outcome: &Outcome,
    ) -> Result<()> {
        self.delivered.push((channel.to_string(), outcome.clone()));
        Ok(())
    }
}
