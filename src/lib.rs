mod app;
mod args;
pub mod commands;
mod config;
pub mod error;
pub mod ledger;
pub mod predict;
mod providers;
pub mod transport;

pub use app::{run_session, Application};
pub use commands::{BotContext, CommandName, Dispatcher, Embed, Outcome, Reply};
pub use config::{BotConfig, CommandConfig, LedgerConfig, ModelConfig, ServerConfig};
pub use error::{CommandError, LedgerError, PredictionError};
pub use ledger::{HistoryCounts, HistoryLog, LedgerStore, RoundEntry, RoundStatus};
pub use predict::{ModelPredictor, Predictor};
pub use providers::ApiProvider;
pub use transport::{ConsoleTransport, IncomingMessage, ScriptedTransport, Transport};

pub async fn run() -> anyhow::Result<()> {
    let app = Application::init().await?;
    app.run().await
}
