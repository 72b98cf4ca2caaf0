//! Platform-neutral replies produced by command handlers.

use std::path::PathBuf;

/// Accent color used by every embed (lime green).
pub const LIME: Rgb = Rgb(50, 205, 50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Rich message card, modelled after chat-platform embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub color: Rgb,
}

impl Default for Embed {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            fields: Vec::new(),
            footer: None,
            color: LIME,
        }
    }
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Embed(Embed),
    /// Upload a file from disk as an attachment.
    File { path: PathBuf },
    /// Remove the channel's message history.
    ClearChannel,
}

/// Everything a handler wants the transport to do for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Remove the message that triggered the command
    pub delete_invocation: bool,
    pub replies: Vec<Reply>,
}

impl Outcome {
    /// Reply and remove the invoking message.
    pub fn consume(replies: Vec<Reply>) -> Self {
        Self {
            delete_invocation: true,
            replies,
        }
    }

    /// Reply and leave the invoking message in place.
    pub fn keep(replies: Vec<Reply>) -> Self {
        Self {
            delete_invocation: false,
            replies,
        }
    }

    /// Iterate over the embeds among the replies.
    pub fn embeds(&self) -> impl Iterator<Item = &Embed> {
        self.replies.iter().filter_map(|r| match r {
            Reply::Embed(embed) => Some(embed),
            _ => None,
        })
    }
}

impl From<Embed> for Reply {
    fn from(embed: Embed) -> Self {
        Reply::Embed(embed)
    }
}
