use crate::args::Cli;
use crate::commands::{BotContext, Dispatcher};
use crate::config::BotConfig;
use crate::ledger::LedgerStore;
use crate::predict::{ModelPredictor, Predictor};
use crate::transport::{ConsoleTransport, Transport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Channel name used by the terminal session.
const CONSOLE_CHANNEL: &str = "console";

pub struct Application {
    config: BotConfig,
}

impl Application {
    pub async fn init() -> anyhow::Result<Application> {
        // `--env-file` (default .env) is loaded before settings are resolved
        let cli = Cli::try_load_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
        let config = BotConfig::setup(cli)?;

        Ok(Application { config })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let ledger = Arc::new(LedgerStore::new(self.config.ledger.clone()));
        let predictor: Arc<dyn Predictor> =
            Arc::new(ModelPredictor::new(self.config.model.clone())?);

        let dispatcher = Dispatcher::new(BotContext {
            ledger,
            predictor,
            config: self.config.commands.clone(),
        });

        let channel = self
            .config
            .commands
            .ready_channel
            .clone()
            .unwrap_or_else(|| CONSOLE_CHANNEL.to_string());
        let mut transport = ConsoleTransport::new(channel);

        run_session(&dispatcher, &mut transport).await
    }
}

/// Drive the bot over `transport` until it runs out of messages.
///
/// The ready announcement goes out first. Failing to deliver a reply is
/// logged and the session carries on; only a broken message source ends it
/// with an error.
pub async fn run_session<T: Transport>(dispatcher: &Dispatcher, transport: &mut T) -> anyhow::Result<()> {
    if let Some((channel, announcement)) = dispatcher.ready_announcement() {
        if let Err(err) = transport.deliver(&channel, None, &announcement).await {
            warn!(channel, "Failed to send ready announcement: {:#}", err);
        }
    }
    info!(bot = %dispatcher.context().config.bot_name, "Bot is ready");

    let mut handled = 0usize;
    while let Some(message) = transport.next_message().await? {
        let Some(outcome) = dispatcher.dispatch(&message.content).await else {
            continue;
        };
        handled += 1;

        if let Err(err) = transport
            .deliver(&message.channel, Some(&message), &outcome)
            .await
        {
            warn!(channel = %message.channel, "Failed to deliver reply: {:#}", err);
        }
    }

    debug!(handled, "Session ended");
    Ok(())
}
