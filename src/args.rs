use clap::{Args, Parser, ValueHint};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_HISTORY_ALL_FILE: &str = "history_all.json";
pub const DEFAULT_HISTORY_RECENT_FILE: &str = "history_recent.json";
pub const DEFAULT_HISTORY_EXPORT_FILE: &str = "history.txt";
pub const DEFAULT_MAX_RECENT: usize = 20;
pub const DEFAULT_MIN_PREDICT_ROUNDS: usize = 5;
pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_BOT_NAME: &str = "predict-bot";

// Model API defaults
pub const DEFAULT_API_PORT: u16 = 443;
pub const DEFAULT_MODEL_ID: &str = "gpt-4o";
pub const DEFAULT_PREDICTION_TIMEOUT_SECS: u64 = 30;

/// Round tracker and next-color predictor for Coinryze.
///
/// Reads `!command` messages (one per line on stdin), keeps the round
/// history on disk and asks a language model for the next color.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to environment file (default: ./.env). Can also use APP_ENV_FILE.
    #[arg(
        long,
        value_hint = ValueHint::FilePath,
        default_value = ".env",
        env = "APP_ENV_FILE"
    )]
    pub(crate) env_file: PathBuf,

    #[command(flatten)]
    pub(crate) ledger: LedgerArgs,

    #[command(flatten)]
    pub(crate) commands: CommandArgs,

    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

impl Cli {
    /// Parse `args` with the variables of the selected env file in place.
    ///
    /// The first pass only finds the env file; the second resolves every
    /// `env = ...` setting against it. Variables already set in the process
    /// environment take precedence over the file.
    pub(crate) fn try_load_from<I, T>(args: I) -> Result<Cli, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        let located = Cli::try_parse_from(&args)?;
        match dotenvy::from_filename(&located.env_file) {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) => debug!("Skipping env file {}: {}", located.env_file.display(), e),
        }

        Cli::try_parse_from(args)
    }
}

/// History storage settings
#[derive(Args, Debug, Clone)]
pub(crate) struct LedgerArgs {
    /// File holding every recorded round
    #[arg(
        long = "history-all-file",
        env = "HISTORY_ALL_FILE",
        value_hint = ValueHint::FilePath,
        default_value = DEFAULT_HISTORY_ALL_FILE
    )]
    pub(crate) full_path: PathBuf,

    /// File holding the recent window
    #[arg(
        long = "history-recent-file",
        env = "HISTORY_RECENT_FILE",
        value_hint = ValueHint::FilePath,
        default_value = DEFAULT_HISTORY_RECENT_FILE
    )]
    pub(crate) recent_path: PathBuf,

    /// Text file written by `showhistory`
    #[arg(
        long = "history-export-file",
        env = "HISTORY_EXPORT_FILE",
        value_hint = ValueHint::FilePath,
        default_value = DEFAULT_HISTORY_EXPORT_FILE
    )]
    pub(crate) export_path: PathBuf,

    /// Number of rounds kept in the recent window
    #[arg(
        long = "max-recent",
        env = "MAX_RECENT",
        value_parser = parse_positive,
        default_value_t = DEFAULT_MAX_RECENT
    )]
    pub(crate) max_recent: usize,
}

/// Command layer settings
#[derive(Args, Debug, Clone)]
pub(crate) struct CommandArgs {
    /// Prefix marking a message as a command
    #[arg(long = "command-prefix", env = "COMMAND_PREFIX", default_value = DEFAULT_COMMAND_PREFIX)]
    pub(crate) prefix: String,

    /// Minimum recent rounds required before `predict` calls the model
    #[arg(
        long = "min-predict-rounds",
        env = "MIN_PREDICT_ROUNDS",
        value_parser = parse_positive,
        default_value_t = DEFAULT_MIN_PREDICT_ROUNDS
    )]
    pub(crate) min_predict_rounds: usize,

    /// Name the bot announces itself with
    #[arg(long = "bot-name", env = "BOT_NAME", default_value = DEFAULT_BOT_NAME)]
    pub(crate) bot_name: String,

    /// Channel that receives the online announcement (optional)
    #[arg(long = "ready-channel", env = "READY_CHANNEL_ID")]
    pub(crate) ready_channel: Option<String>,
}

/// Prediction model settings
#[derive(Args, Debug, Clone)]
pub(crate) struct ModelArgs {
    /// Model API domain, without scheme (e.g., api.openai.com)
    #[arg(
        long = "model-api-domain",
        env = "MODEL_API_DOMAIN",
        value_hint = ValueHint::Hostname
    )]
    pub(crate) api_domain: Option<String>,

    /// Model API port
    #[arg(long = "model-api-port", env = "MODEL_API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub(crate) api_port: u16,

    /// Model API route for chat requests (defaults to the provider's endpoint)
    #[arg(long = "model-chat-route", env = "MODEL_CHAT_ROUTE")]
    pub(crate) chat_route: Option<String>,

    /// Model used for predictions
    #[arg(long = "model-id", env = "MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub(crate) model_id: String,

    /// Seconds to wait for a prediction before giving up
    #[arg(
        long = "prediction-timeout",
        env = "PREDICTION_TIMEOUT_SECS",
        default_value_t = DEFAULT_PREDICTION_TIMEOUT_SECS
    )]
    pub(crate) timeout_secs: u64,

    /// Talk plain HTTP to the model API (local test servers only)
    #[arg(
        long = "model-api-plaintext",
        env = "MODEL_API_PLAINTEXT",
        default_value_t = false,
        hide = true
    )]
    pub(crate) plaintext: bool,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid number '{}': {}", s, e)),
    }
}
