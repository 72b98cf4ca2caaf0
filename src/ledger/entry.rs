use crate::error::LedgerError;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label of the game every round is recorded for.
pub const SOURCE_LABEL: &str = "Coinryze";

/// Timestamp layout used for every entry (local time, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundStatus {
    Win,
    Lose,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Win => "WIN",
            RoundStatus::Lose => "LOSE",
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WIN" => Ok(RoundStatus::Win),
            "LOSE" => Ok(RoundStatus::Lose),
            _ => Err(LedgerError::InvalidStatus(s.to_string())),
        }
    }
}

/// One recorded round. Entries are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEntry {
    /// 1-based position in the full history
    pub round: u64,
    pub status: RoundStatus,
    /// Upper-cased, free text
    pub color: String,
    pub timestamp: String,
    pub source: String,
}

impl RoundEntry {
    /// Build the entry for `round`, normalizing the color and stamping the current local time.
    pub(crate) fn new(round: u64, color: &str, status: RoundStatus) -> Result<Self, LedgerError> {
        let color = normalize_color(color)?;
        Ok(Self {
            round,
            status,
            color,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            source: SOURCE_LABEL.to_string(),
        })
    }
}

/// Trim and upper-case a color label; empty labels are rejected.
pub fn normalize_color(color: &str) -> Result<String, LedgerError> {
    let color = color.trim();
    if color.is_empty() {
        return Err(LedgerError::EmptyColor);
    }
    Ok(color.to_uppercase())
}
