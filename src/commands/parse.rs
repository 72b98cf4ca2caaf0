use super::CommandName;
use std::str::FromStr;

/// A recognised command with its raw argument string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub name: CommandName,
    pub args: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed<'a> {
    /// Ordinary chat, not addressed to the bot
    NotACommand,
    /// Prefixed, but the name is not in the dispatch table
    Unknown(&'a str),
    Command(Invocation<'a>),
}

/// Split `!name rest of line` into a command name and its arguments.
pub fn parse_invocation<'a>(prefix: &str, text: &'a str) -> Parsed<'a> {
    let Some(body) = text.trim_start().strip_prefix(prefix) else {
        return Parsed::NotACommand;
    };

    let body = body.trim();
    let (name, args) = match body.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return Parsed::NotACommand;
    }

    match CommandName::from_str(name) {
        Ok(name) => Parsed::Command(Invocation { name, args }),
        Err(_) => Parsed::Unknown(name),
    }
}
