use super::{IncomingMessage, Transport};
use crate::commands::{Embed, Outcome, Reply};
use anyhow::{Context, Result};
use async_trait::async_trait;
use dialoguer::console::{style, Term};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

/// Terminal transport: every stdin line is a message on one local channel,
/// and replies are rendered to stdout through the `plain` log target.
pub struct ConsoleTransport {
    channel: String,
    author: String,
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleTransport {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            author: whoami(),
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "console".to_string())
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>> {
        info!(target: "plain", "{} (type 'exit' to end)", style(format!("💬 #{}", self.channel)).cyan().bold());

        let Some(line) = self
            .lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        else {
            debug!("stdin closed");
            return Ok(None);
        };

        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") {
            return Ok(None);
        }
        Ok(Some(IncomingMessage::new(
            self.channel.clone(),
            self.author.clone(),
            line,
        )))
    }

    async fn deliver(
        &mut self,
        channel: &str,
        invocation: Option<&IncomingMessage>,
        outcome: &Outcome,
    ) -> Result<()> {
        if outcome.delete_invocation {
            if let Some(message) = invocation {
                debug!(channel, "Removing invocation '{}'", message.content);
            }
        }

        for reply in &outcome.replies {
            match reply {
                Reply::Embed(embed) => render_embed(channel, embed),
                Reply::File { path } => {
                    info!(target: "plain", "{} {} → {}", style("📎").dim(), style("attachment").bold(), path.display());
                }
                Reply::ClearChannel => {
                    Term::stdout()
                        .clear_screen()
                        .context("Failed to clear the terminal")?;
                }
            }
        }
        Ok(())
    }
}

fn render_embed(channel: &str, embed: &Embed) {
    let (r, g, b) = (embed.color.0, embed.color.1, embed.color.2);
    let bar = style("┃").color256(rgb_to_ansi256(r, g, b));

    let mut out = format!("{} {}\n", style(format!("#{channel}")).dim(), bar);
    if let Some(title) = &embed.title {
        out.push_str(&format!("{bar} {}\n", style(title).bold()));
    }
    if let Some(description) = &embed.description {
        for line in description.lines() {
            out.push_str(&format!("{bar} {line}\n"));
        }
    }
    for field in &embed.fields {
        out.push_str(&format!("{bar} {}\n", style(&field.name).bold().underlined()));
        for line in field.value.lines() {
            out.push_str(&format!("{bar} {line}\n"));
        }
    }
    if let Some(footer) = &embed.footer {
        out.push_str(&format!("{bar} {}\n", style(footer).dim()));
    }
    info!(target: "plain", "{}", out.trim_end());
}

/// Nearest color in the 6x6x6 ANSI cube.
fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}
