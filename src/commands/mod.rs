//! Chat command layer.
//!
//! Messages are parsed into a [`CommandName`] plus arguments and routed
//! through a dispatch table to one [`CommandHandler`] per command. Handlers
//! only touch the world through the ledger and the predictor they are given,
//! and describe their effect as an [`Outcome`] for the transport to deliver.

mod handlers;
mod parse;
pub mod reply;

pub use parse::{parse_invocation, Invocation, Parsed};
pub use reply::{Embed, Outcome, Reply};

use crate::config::CommandConfig;
use crate::error::CommandError;
use crate::ledger::LedgerStore;
use crate::predict::Predictor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumIter, EnumMessage, EnumString, IntoEnumIterator};
use tracing::{debug, info, warn};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumMessage,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandName {
    #[strum(message = "Predict the next color from recent rounds")]
    Predict,
    #[strum(message = "Record a won round: win <color>")]
    Win,
    #[strum(message = "Record a lost round: lose <color>")]
    Lose,
    #[strum(message = "Send the full history as a file")]
    ShowHistory,
    #[strum(message = "Show the recent rounds")]
    History,
    #[strum(message = "Erase all recorded rounds")]
    Reset,
    #[strum(message = "Show round counts")]
    Status,
    #[strum(message = "Repeat a message: say <text>")]
    Say,
    #[strum(message = "Clear the channel")]
    ClearChat,
    #[strum(message = "List the available commands")]
    Help,
}

/// Shared state every handler can reach.
pub struct BotContext {
    pub ledger: Arc<LedgerStore>,
    pub predictor: Arc<dyn Predictor>,
    pub config: CommandConfig,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &BotContext, args: &str) -> Result<Outcome, CommandError>;
}

/// Routes parsed commands to their handlers.
pub struct Dispatcher {
    context: BotContext,
    handlers: HashMap<CommandName, Box<dyn CommandHandler>>,
}

impl Dispatcher {
    /// Build a dispatcher with every command registered.
    pub fn new(context: BotContext) -> Self {
        let handlers = CommandName::iter()
            .map(|name| (name, handlers::handler_for(name)))
            .collect();
        Self { context, handlers }
    }

    pub fn context(&self) -> &BotContext {
        &self.context
    }

    /// Handle one chat message. `None` when the message is not a known command.
    pub async fn dispatch(&self, text: &str) -> Option<Outcome> {
        let invocation = match parse_invocation(&self.context.config.prefix, text) {
            Parsed::Command(invocation) => invocation,
            Parsed::Unknown(name) => {
                debug!("Ignoring unknown command '{}'", name);
                return None;
            }
            Parsed::NotACommand => return None,
        };

        let handler = self.handlers.get(&invocation.name)?;
        info!(command = %invocation.name, "Handling command");

        let outcome = match handler.handle(&self.context, invocation.args).await {
            Ok(outcome) => outcome,
            Err(CommandError::Usage(usage)) => {
                Outcome::keep(vec![Embed::new().description(format!("ℹ️ {}", usage)).into()])
            }
            Err(err) => {
                warn!(command = %invocation.name, "Command failed: {}", err);
                Outcome::keep(vec![Embed::new()
                    .title("⚠️ Command Failed")
                    .description(format!("`{}` could not be completed: {}", invocation.name, err))
                    .into()])
            }
        };
        Some(outcome)
    }

    /// Announcement for the ready channel, if one is configured.
    pub fn ready_announcement(&self) -> Option<(String, Outcome)> {
        let channel = self.context.config.ready_channel.clone()?;
        let embed = Embed::new()
            .title(format!("✅ Bot is now online as {}", self.context.config.bot_name))
            .description(format!(
                "🔥 Get Ready to Earn Money with TeamBeast Predictions! 💰\nType `{}predict` to start your winning streak!",
                self.context.config.prefix
            ));
        Some((channel, Outcome::keep(vec![embed.into()])))
    }
}

impl CommandName {
    /// One-line description used by `help`.
    pub fn summary(&self) -> &'static str {
        self.get_message().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_command_names() {
        assert_eq!(CommandName::ShowHistory.to_string(), "showhistory");
        assert_eq!(CommandName::ClearChat.to_string(), "clearchat");
        assert_eq!(CommandName::from_str("PREDICT").unwrap(), CommandName::Predict);
        assert!(CommandName::from_str("dance").is_err());
    }

    #[test]
    fn test_every_command_has_a_summary() {
        for name in CommandName::iter() {
            assert!(!name.summary().is_empty(), "{name} has no summary");
        }
    }
}
