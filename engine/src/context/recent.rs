//! Recency-window context
//!
//! Picks the newest turns that fit a character budget and a turn cap, then
//! renders them oldest first. Lengths are counted in UTF-16 code units, so a
//! character outside the Basic Multilingual Plane (most emoji) costs two.

use crate::memory::{ConversationStore, Turn};

use super::RECENT_PREFIX;

/// Default character budget for the recency window
pub const DEFAULT_RECENT_MAX_CHARS: usize = 400;

/// Default number of turns in the recency window
pub const DEFAULT_RECENT_MAX_TURNS: usize = 5;

/// Limits applied when selecting recent turns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentBudget {
    /// Maximum total rendered characters of the selected turns
    pub max_chars: usize,

    /// Maximum number of selected turns
    pub max_turns: usize,
}

impl Default for RecentBudget {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_RECENT_MAX_CHARS,
            max_turns: DEFAULT_RECENT_MAX_TURNS,
        }
    }
}

/// Build the recency-window context, or an empty string when there are no turns.
///
/// Walks from the newest turn backwards and stops at the first turn that would
/// overflow the character budget. The newest turn is always included, even if
/// it alone exceeds the budget.
pub fn select_recent(store: &ConversationStore, budget: RecentBudget) -> String {
    let Some(newest) = store.latest() else {
        return String::new();
    };

    let max_turns = budget.max_turns.min(store.len());
    let mut selected: Vec<&Turn> = Vec::with_capacity(max_turns);
    let mut total_chars = 0;

    for turn in store.iter().rev() {
        if selected.len() >= max_turns {
            break;
        }

        let len = turn.rendered_len();
        if total_chars + len > budget.max_chars {
            break;
        }

        selected.push(turn);
        total_chars += len;
    }

    if selected.is_empty() {
        tracing::debug!("Newest turn exceeds the recent-context budget, including it anyway");
        selected.push(newest);
    }

    let body = selected
        .iter()
        .rev()
        .map(|turn| turn.render())
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}", RECENT_PREFIX, body)
}
