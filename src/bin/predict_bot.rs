use anyhow::{Context, Result};
use dialoguer::console::style;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Used when RUST_LOG is unset.
const DEFAULT_LOG_FILTER: &str = "warn,predict_bot=info";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging().context("initializing logging")?;

    print_welcome();

    predict_bot::run().await
}

fn init_logging() -> Result<()> {
    // Bot replies and banners: bare text, no timestamp or level
    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(
            tracing_subscriber::fmt::format()
                .without_time()
                .with_level(false)
                .with_target(false)
                .compact(),
        )
        .with_filter(Targets::new().with_target("plain", LevelFilter::TRACE));

    let diagnostics_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let diagnostics_layer = tracing_subscriber::fmt::layer().with_filter(diagnostics_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(diagnostics_layer)
        .try_init()
        .context("a global subscriber is already set")
}

fn print_welcome() {
    let sep = style("◆").green().bold();
    let title = style("Coinryze Prediction Bot").bold();
    let subtitle = style("Record rounds, review history, and ask the model for the next color.").dim();

    info!(target: "plain", "\n{sep} {title} {sep}\n{subtitle}\n");
}
