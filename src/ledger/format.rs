use super::RoundEntry;

/// Text returned for an empty history.
pub const EMPTY_HISTORY: &str = "No history found.";

/// Render a history as one line per round, preserving order.
pub fn format_history_text(history: &[RoundEntry]) -> String {
    if history.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    history
        .iter()
        .map(|item| {
            format!(
                "Round {}: [{}] {} at {} ({})",
                item.round, item.status, item.color, item.timestamp, item.source
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
