use super::reply::{Embed, Outcome, Reply};
use super::{BotContext, CommandHandler, CommandName};
use crate::error::{CommandError, PredictionError};
use crate::ledger::{format_history_text, HistoryLog, RoundStatus};
use async_trait::async_trait;
use strum::IntoEnumIterator;
use tracing::warn;

pub(super) fn handler_for(name: CommandName) -> Box<dyn CommandHandler> {
    match name {
        CommandName::Predict => Box::new(PredictCommand),
        CommandName::Win => Box::new(RecordCommand {
            name,
            status: RoundStatus::Win,
        }),
        CommandName::Lose => Box::new(RecordCommand {
            name,
            status: RoundStatus::Lose,
        }),
        CommandName::ShowHistory => Box::new(ShowHistoryCommand),
        CommandName::History => Box::new(HistoryCommand),
        CommandName::Reset => Box::new(ResetCommand),
        CommandName::Status => Box::new(StatusCommand),
        CommandName::Say => Box::new(SayCommand),
        CommandName::ClearChat => Box::new(ClearChatCommand),
        CommandName::Help => Box::new(HelpCommand),
    }
}

struct PredictCommand;

#[async_trait]
impl CommandHandler for PredictCommand {
    async fn handle(&self, ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        let recent = ctx.ledger.load(HistoryLog::Recent);
        let need = ctx.config.min_predict_rounds;

        if recent.len() < need {
            let warning = Embed::new().description(format!(
                "⚠️ Need at least {} rounds of history to predict. Use {p}win or {p}lose to add.",
                need,
                p = ctx.config.prefix
            ));
            return Ok(Outcome::keep(vec![warning.into()]));
        }

        let embed = match ctx.predictor.predict(&recent).await {
            Ok(prediction) => Embed::new()
                .title("🎯 Prediction Result")
                .description(format!(
                    "Based on the last {} rounds, my next color prediction is:",
                    recent.len()
                ))
                .field("🧠 GPT Suggests", format!("**{}**", prediction.to_uppercase()), false)
                .footer(format!("Prediction powered by {}", ctx.predictor.name())),
            Err(err) => {
                warn!("Prediction failed: {}", err);
                prediction_failure(&err)
            }
        };

        Ok(Outcome::consume(vec![embed.into()]))
    }
}

fn prediction_failure(err: &PredictionError) -> Embed {
    let description = match err {
        PredictionError::InsufficientHistory { have, need } => format!(
            "Only {} rounds recorded, at least {} are needed.",
            have, need
        ),
        PredictionError::Timeout(after) => format!(
            "The prediction service did not answer within {}s. Please try again.",
            after.as_secs_f32()
        ),
        PredictionError::Status { status, .. } => {
            format!("The prediction service rejected the request ({}).", status)
        }
        PredictionError::Transport(_) => "Could not reach the prediction service.".to_string(),
        PredictionError::MalformedResponse(_) => {
            "The prediction service sent an answer I could not read.".to_string()
        }
    };
    Embed::new()
        .title("⚠️ Prediction Unavailable")
        .description(description)
}

struct RecordCommand {
    name: CommandName,
    status: RoundStatus,
}

#[async_trait]
impl CommandHandler for RecordCommand {
    async fn handle(&self, ctx: &BotContext, args: &str) -> Result<Outcome, CommandError> {
        let Some(color) = args.split_whitespace().next() else {
            return Err(CommandError::Usage(format!(
                "Usage: {}{} <color>",
                ctx.config.prefix, self.name
            )));
        };

        let entry = ctx.ledger.append(color, self.status)?;

        let embed = match self.status {
            RoundStatus::Win => Embed::new().title("✅ Win Recorded").description(format!(
                "Round added as WIN for **{}**. Let's keep tracking! 🧠",
                entry.color
            )),
            RoundStatus::Lose => Embed::new().title("❌ Loss Recorded").description(format!(
                "Round logged as LOSE for **{}**. Learning from this, adjusting strategy! 🔄",
                entry.color
            )),
        };
        Ok(Outcome::consume(vec![embed.into()]))
    }
}

struct ShowHistoryCommand;

#[async_trait]
impl CommandHandler for ShowHistoryCommand {
    async fn handle(&self, ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        let path = ctx.ledger.export_full()?;
        let embed = Embed::new()
            .title("📜 Full History Log")
            .description("Here's the full history log so far. (Sent as a file)");
        Ok(Outcome::consume(vec![embed.into(), Reply::File { path }]))
    }
}

struct HistoryCommand;

#[async_trait]
impl CommandHandler for HistoryCommand {
    async fn handle(&self, ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        let recent = ctx.ledger.load(HistoryLog::Recent);
        let embed = if recent.is_empty() {
            Embed::new().description("📜 No recent history found.")
        } else {
            Embed::new()
                .title(format!(
                    "📜 Last {} Rounds History",
                    ctx.ledger.config().max_recent
                ))
                .description(format_history_text(&recent))
        };
        Ok(Outcome::consume(vec![embed.into()]))
    }
}

struct ResetCommand;

#[async_trait]
impl CommandHandler for ResetCommand {
    async fn handle(&self, ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        ctx.ledger.reset()?;
        let embed = Embed::new()
            .title("🔄 History Reset")
            .description("All history has been reset. Starting fresh!");
        Ok(Outcome::consume(vec![embed.into()]))
    }
}

struct StatusCommand;

#[async_trait]
impl CommandHandler for StatusCommand {
    async fn handle(&self, ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        let counts = ctx.ledger.counts();
        let embed = Embed::new().title("📊 Current Stats").description(format!(
            "- Total rounds: {}\n- Recent rounds (last {}): {}",
            counts.full,
            ctx.ledger.config().max_recent,
            counts.recent
        ));
        Ok(Outcome::consume(vec![embed.into()]))
    }
}

struct SayCommand;

#[async_trait]
impl CommandHandler for SayCommand {
    async fn handle(&self, ctx: &BotContext, args: &str) -> Result<Outcome, CommandError> {
        if args.is_empty() {
            return Err(CommandError::Usage(format!(
                "Usage: {}say <message>",
                ctx.config.prefix
            )));
        }
        let embed = Embed::new().description(format!("📢 {}", args));
        Ok(Outcome::consume(vec![embed.into()]))
    }
}

struct ClearChatCommand;

#[async_trait]
impl CommandHandler for ClearChatCommand {
    async fn handle(&self, _ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        // The purge takes the invoking message with it.
        let embed = Embed::new()
            .title("🧹 Chat Cleared")
            .description("Chat cleared!");
        Ok(Outcome::keep(vec![Reply::ClearChannel, embed.into()]))
    }
}

struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn handle(&self, ctx: &BotContext, _args: &str) -> Result<Outcome, CommandError> {
        let lines = CommandName::iter()
            .map(|name| format!("`{}{}` · {}", ctx.config.prefix, name, name.summary()))
            .collect::<Vec<_>>()
            .join("\n");
        let embed = Embed::new().title("📖 Commands").description(lines);
        Ok(Outcome::consume(vec![embed.into()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Dispatcher;
    use crate::config::{CommandConfig, LedgerConfig};
    use crate::ledger::{LedgerStore, RoundEntry};
    use crate::predict::Predictor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct StubPredictor {
        calls: AtomicUsize,
        fail_with_timeout: bool,
    }

    #[async_trait]
    impl Predictor for StubPredictor {
        fn name(&self) -> &str {
            "stub"
        }

        async fn predict(&self, _recent: &[RoundEntry]) -> Result<String, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_timeout {
                Err(PredictionError::Timeout(Duration::from_secs(30)))
            } else {
                Ok("green".to_string())
            }
        }
    }

    fn dispatcher(dir: &TempDir, predictor: Arc<StubPredictor>) -> Dispatcher {
        let ledger = LedgerConfig::builder()
            .full_path(dir.path().join("history_all.json"))
            .recent_path(dir.path().join("history_recent.json"))
            .export_path(dir.path().join("history.txt"))
            .build()
            .unwrap();
        Dispatcher::new(BotContext {
            ledger: Arc::new(LedgerStore::new(ledger)),
            predictor,
            config: CommandConfig::builder().build().unwrap(),
        })
    }

    fn only_embed(outcome: &Outcome) -> &Embed {
        let embeds: Vec<_> = outcome.embeds().collect();
        assert_eq!(embeds.len(), 1);
        embeds[0]
    }

    #[tokio::test]
    async fn test_predict_needs_enough_history() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Arc::new(StubPredictor::default());
        let bot = dispatcher(&dir, predictor.clone());

        for _ in 0..4 {
            bot.dispatch("!win red").await.unwrap();
        }
        let outcome = bot.dispatch("!predict").await.unwrap();

        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
        assert!(!outcome.delete_invocation);
        assert!(only_embed(&outcome)
            .description
            .as_deref()
            .unwrap()
            .starts_with("⚠️ Need at least 5 rounds"));
        assert_eq!(bot.context().ledger.counts().full, 4);
    }

    #[tokio::test]
    async fn test_predict_with_history() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Arc::new(StubPredictor::default());
        let bot = dispatcher(&dir, predictor.clone());

        for color in ["red", "green", "violet", "red", "green"] {
            bot.dispatch(&format!("!lose {color}")).await.unwrap();
        }
        let outcome = bot.dispatch("!predict").await.unwrap();

        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
        assert!(outcome.delete_invocation);
        let embed = only_embed(&outcome);
        assert_eq!(embed.title.as_deref(), Some("🎯 Prediction Result"));
        assert_eq!(embed.fields[0].value, "**GREEN**");
        assert_eq!(embed.footer.as_deref(), Some("Prediction powered by stub"));
    }

    #[tokio::test]
    async fn test_prediction_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = Arc::new(StubPredictor {
            fail_with_timeout: true,
            ..Default::default()
        });
        let bot = dispatcher(&dir, predictor);

        for _ in 0..5 {
            bot.dispatch("!win red").await.unwrap();
        }
        let outcome = bot.dispatch("!predict").await.unwrap();

        let embed = only_embed(&outcome);
        assert_eq!(embed.title.as_deref(), Some("⚠️ Prediction Unavailable"));
        assert!(embed.description.as_deref().unwrap().contains("30s"));
    }

    #[tokio::test]
    async fn test_win_and_lose_record_rounds() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));

        let win = bot.dispatch("!win red").await.unwrap();
        assert!(win.delete_invocation);
        assert_eq!(only_embed(&win).title.as_deref(), Some("✅ Win Recorded"));
        assert!(only_embed(&win)
            .description
            .as_deref()
            .unwrap()
            .contains("**RED**"));

        let lose = bot.dispatch("!lose Violet").await.unwrap();
        assert_eq!(only_embed(&lose).title.as_deref(), Some("❌ Loss Recorded"));

        let recent = bot.context().ledger.load(HistoryLog::Recent);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].status, RoundStatus::Lose);
        assert_eq!(recent[1].color, "VIOLET");
    }

    #[tokio::test]
    async fn test_failed_command_keeps_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let ledger = LedgerConfig::builder()
            .full_path(blocker.join("history_all.json"))
            .recent_path(blocker.join("history_recent.json"))
            .export_path(blocker.join("history.txt"))
            .build()
            .unwrap();
        let bot = Dispatcher::new(BotContext {
            ledger: Arc::new(LedgerStore::new(ledger)),
            predictor: Arc::new(StubPredictor::default()),
            config: CommandConfig::builder().build().unwrap(),
        });

        let outcome = bot.dispatch("!win red").await.unwrap();

        assert!(!outcome.delete_invocation);
        let embed = only_embed(&outcome);
        assert_eq!(embed.title.as_deref(), Some("⚠️ Command Failed"));
        assert!(embed.description.as_deref().unwrap().starts_with("`win` could not be completed"));
    }

    #[tokio::test]
    async fn test_record_without_color_shows_usage() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));

        let outcome = bot.dispatch("!win").await.unwrap();

        assert!(!outcome.delete_invocation);
        assert_eq!(
            only_embed(&outcome).description.as_deref(),
            Some("ℹ️ Usage: !win <color>")
        );
        assert_eq!(bot.context().ledger.counts().full, 0);
    }

    #[tokio::test]
    async fn test_history_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));

        let empty = bot.dispatch("!history").await.unwrap();
        assert_eq!(
            only_embed(&empty).description.as_deref(),
            Some("📜 No recent history found.")
        );

        bot.dispatch("!win red").await.unwrap();
        let history = bot.dispatch("!history").await.unwrap();
        let embed = only_embed(&history);
        assert_eq!(embed.title.as_deref(), Some("📜 Last 20 Rounds History"));
        assert!(embed
            .description
            .as_deref()
            .unwrap()
            .starts_with("Round 1: [WIN] RED at "));

        let status = bot.dispatch("!status").await.unwrap();
        assert_eq!(
            only_embed(&status).description.as_deref(),
            Some("- Total rounds: 1\n- Recent rounds (last 20): 1")
        );
    }

    #[tokio::test]
    async fn test_showhistory_attaches_export() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));
        bot.dispatch("!lose green").await.unwrap();

        let outcome = bot.dispatch("!showhistory").await.unwrap();

        let path = outcome
            .replies
            .iter()
            .find_map(|r| match r {
                Reply::File { path } => Some(path.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(path, dir.path().join("history.txt"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("Round 1: [LOSE] GREEN at "));
    }

    #[tokio::test]
    async fn test_reset_say_clearchat_help() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));
        bot.dispatch("!win red").await.unwrap();

        let reset = bot.dispatch("!reset").await.unwrap();
        assert_eq!(only_embed(&reset).title.as_deref(), Some("🔄 History Reset"));
        assert_eq!(bot.context().ledger.counts().full, 0);

        let say = bot.dispatch("!say good luck all").await.unwrap();
        assert_eq!(
            only_embed(&say).description.as_deref(),
            Some("📢 good luck all")
        );

        let clear = bot.dispatch("!clearchat").await.unwrap();
        assert_eq!(clear.replies[0], Reply::ClearChannel);
        assert!(!clear.delete_invocation);

        let help = bot.dispatch("!help").await.unwrap();
        let listing = only_embed(&help).description.clone().unwrap();
        assert!(listing.contains("`!showhistory`"));
        assert_eq!(listing.lines().count(), CommandName::iter().count());
    }

    #[tokio::test]
    async fn test_non_commands_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));

        assert!(bot.dispatch("hello there").await.is_none());
        assert!(bot.dispatch("!dance").await.is_none());
    }

    #[test]
    fn test_ready_announcement_needs_channel() {
        let dir = tempfile::tempdir().unwrap();
        let bot = dispatcher(&dir, Arc::new(StubPredictor::default()));
        assert!(bot.ready_announcement().is_none());
    }
}
