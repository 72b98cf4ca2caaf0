use crate::args::{
    Cli, CommandArgs, LedgerArgs, ModelArgs, DEFAULT_BOT_NAME, DEFAULT_COMMAND_PREFIX,
    DEFAULT_HISTORY_ALL_FILE, DEFAULT_HISTORY_EXPORT_FILE, DEFAULT_HISTORY_RECENT_FILE,
    DEFAULT_MAX_RECENT, DEFAULT_MIN_PREDICT_ROUNDS, DEFAULT_PREDICTION_TIMEOUT_SECS,
};
use crate::config::{load_api_domain::load_api_domain, load_api_key::load_api_key};
use anyhow::{Context, Result};
use derive_builder::Builder;
use dialoguer::console::style;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod load_api_domain;
mod load_api_key;

#[derive(Builder, Clone, Debug)]
pub struct LedgerConfig {
    /// Every recorded round
    #[builder(setter(into), default = "PathBuf::from(DEFAULT_HISTORY_ALL_FILE)")]
    pub full_path: PathBuf,
    /// The recent window
    #[builder(setter(into), default = "PathBuf::from(DEFAULT_HISTORY_RECENT_FILE)")]
    pub recent_path: PathBuf,
    /// Text artifact produced by `showhistory`
    #[builder(setter(into), default = "PathBuf::from(DEFAULT_HISTORY_EXPORT_FILE)")]
    pub export_path: PathBuf,
    /// Capacity of the recent window
    #[builder(default = "DEFAULT_MAX_RECENT")]
    pub max_recent: usize,
}

impl LedgerConfig {
    pub fn builder() -> LedgerConfigBuilder {
        LedgerConfigBuilder::default()
    }
}

#[derive(Builder, Clone, Debug)]
pub struct ServerConfig {
    /// The domain of the server hosting the model API
    #[builder(setter(into))]
    pub(crate) domain: String,
    /// The port of the server hosting the model API
    #[builder(setter(into), default = "443")]
    pub(crate) port: u16,
    /// Use plain HTTP instead of HTTPS
    #[builder(default)]
    pub(crate) plaintext: bool,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    pub(crate) fn base_url(&self) -> String {
        let scheme = if self.plaintext { "http" } else { "https" };
        format!("{}://{}:{}", scheme, self.domain, self.port)
    }
}

#[derive(Builder, Clone)]
pub struct ModelConfig {
    pub(crate) server: ServerConfig,
    /// Route for chat requests; the provider's default when unset
    #[builder(setter(into, strip_option), default)]
    pub(crate) chat_route: Option<String>,
    /// The API key for authentication with the model API
    #[builder(setter(into))]
    pub(crate) api_key: String,
    /// The ID of the model
    #[builder(setter(into))]
    pub model_id: String,
    /// Upper bound on one prediction request
    #[builder(default = "Duration::from_secs(DEFAULT_PREDICTION_TIMEOUT_SECS)")]
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }
}

#[derive(Builder, Clone, Debug)]
pub struct CommandConfig {
    #[builder(setter(into), default = "String::from(DEFAULT_COMMAND_PREFIX)")]
    pub prefix: String,
    /// Recent rounds needed before a prediction is requested
    #[builder(default = "DEFAULT_MIN_PREDICT_ROUNDS")]
    pub min_predict_rounds: usize,
    #[builder(setter(into), default = "String::from(DEFAULT_BOT_NAME)")]
    pub bot_name: String,
    /// Channel receiving the online announcement
    #[builder(setter(into, strip_option), default)]
    pub ready_channel: Option<String>,
}

impl CommandConfig {
    pub fn builder() -> CommandConfigBuilder {
        CommandConfigBuilder::default()
    }
}

#[derive(Builder, Clone)]
#[builder(pattern = "owned")]
pub struct BotConfig {
    pub ledger: LedgerConfig,
    pub commands: CommandConfig,
    pub model: ModelConfig,
}

impl BotConfig {
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    pub(crate) fn setup(cli: Cli) -> Result<BotConfig> {
        let ledger = ledger_config(cli.ledger)?;
        let commands = command_config(cli.commands)?;
        let model = model_config(cli.model)?;

        let config = Self::builder()
            .ledger(ledger)
            .commands(commands)
            .model(model)
            .build()
            .context("Failed to build bot configuration")?;

        Self::print_config_summary(&config);

        Ok(config)
    }

    fn print_config_summary(config: &BotConfig) {
        let check = || style("✔").green().bold();

        let kv = |k: &str, v: String| {
            format!(
                "{} {} {}",
                check(),
                style(k).bold(),
                style(format!("· {}", v)).dim()
            )
        };

        info!(target: "plain",
            "{}",
            kv(
                "History files",
                format!(
                    "{} | {}",
                    config.ledger.full_path.display(),
                    config.ledger.recent_path.display()
                ),
            )
        );
        info!(target: "plain", "{}", kv("Recent window", config.ledger.max_recent.to_string()));
        info!(target: "plain",
            "{}",
            kv("Model Inference API", config.model.server.base_url())
        );
        info!(target: "plain", "{}", kv("Model ID", config.model.model_id.clone()));
        info!(target: "plain",
            "{}",
            kv("Prediction timeout", format!("{:?}", config.model.timeout))
        );
        info!(target: "plain",
            "{} {} {}\n",
            style("✔").blue(),
            style("Configuration complete").bold(),
            style("✔").blue()
        );
    }
}

fn ledger_config(args: LedgerArgs) -> Result<LedgerConfig> {
    LedgerConfig::builder()
        .full_path(args.full_path)
        .recent_path(args.recent_path)
        .export_path(args.export_path)
        .max_recent(args.max_recent)
        .build()
        .context("Failed to build ledger configuration")
}

fn command_config(args: CommandArgs) -> Result<CommandConfig> {
    let mut builder = CommandConfig::builder();
    builder
        .prefix(args.prefix)
        .min_predict_rounds(args.min_predict_rounds)
        .bot_name(args.bot_name);
    if let Some(channel) = args.ready_channel {
        builder.ready_channel(channel);
    }
    builder
        .build()
        .context("Failed to build command configuration")
}

fn model_config(args: ModelArgs) -> Result<ModelConfig> {
    let domain = load_api_domain(args.api_domain).context("Failed to load API domain")?;
    let api_key = load_api_key().context("Failed to load API key")?;

    let server = ServerConfig::builder()
        .domain(domain)
        .port(args.api_port)
        .plaintext(args.plaintext)
        .build()
        .context("Failed to build server configuration")?;

    let mut builder = ModelConfig::builder();
    builder
        .server(server)
        .api_key(api_key)
        .model_id(args.model_id)
        .timeout(Duration::from_secs(args.timeout_secs));
    if let Some(route) = args.chat_route {
        builder.chat_route(route);
    }
    builder.build().context("Failed to build model configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_defaults() {
        let config = LedgerConfig::builder().build().unwrap();

        assert_eq!(config.full_path, PathBuf::from("history_all.json"));
        assert_eq!(config.recent_path, PathBuf::from("history_recent.json"));
        assert_eq!(config.export_path, PathBuf::from("history.txt"));
        assert_eq!(config.max_recent, 20);
    }

    #[test]
    fn test_command_defaults() {
        let config = CommandConfig::builder().build().unwrap();

        assert_eq!(config.prefix, "!");
        assert_eq!(config.min_predict_rounds, 5);
        assert!(config.ready_channel.is_none());
    }

    #[test]
    fn test_base_url() {
        let https = ServerConfig::builder()
            .domain("api.openai.com")
            .build()
            .unwrap();
        assert_eq!(https.base_url(), "https://api.openai.com:443");

        let http = ServerConfig::builder()
            .domain("127.0.0.1")
            .port(8080u16)
            .plaintext(true)
            .build()
            .unwrap();
        assert_eq!(http.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_model_config_requires_key() {
        let server = ServerConfig::builder().domain("localhost").build().unwrap();
        assert!(ModelConfig::builder()
            .server(server)
            .model_id("gpt-4o")
            .build()
            .is_err());
    }
}
