//! Prompt text for next-color predictions.

use crate::ledger::RoundEntry;

/// System message sent with every prediction request.
pub const SYSTEM_PROMPT: &str = "You are a helpful predictor.";

/// Colors a Coinryze round can land on.
pub const KNOWN_COLORS: [&str; 3] = ["RED", "GREEN", "VIOLET"];

fn instructions(rounds: usize) -> String {
    format!(
        "You are a professional color predictor for a game called Coinryze, \
where players choose RED, GREEN, or VIOLET based on previous results. \
Predict the next most likely color based on the last {} results. \
Return only the color name (RED, GREEN, or VIOLET).",
        rounds
    )
}

/// Build the user prompt from the recent window, oldest round first.
///
/// Each line carries the round's color, annotated with whether the player won it.
pub fn build_prediction_prompt(recent: &[RoundEntry]) -> String {
    let mut prompt = format!("{}\n\nRecent results:\n", instructions(recent.len()));
    for item in recent {
        prompt.push_str(&format!("- {} ({})\n", item.color, item.status));
    }
    prompt.push_str("\nPrediction:");
    prompt
}

/// Reduce a model reply to a single upper-case label.
///
/// Returns the first known color mentioned, otherwise the first non-empty
/// line as free text. `None` when the reply has no usable content.
pub fn normalize_prediction(reply: &str) -> Option<String> {
    let upper = reply.trim().to_uppercase();

    let known = upper
        .split(|c: char| !c.is_alphanumeric())
        .find(|word| KNOWN_COLORS.contains(word));
    if let Some(color) = known {
        return Some(color.to_string());
    }

    upper
        .lines()
        .map(|line| line.trim().trim_matches(|c: char| c == '*' || c == '.' || c == '"'))
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
