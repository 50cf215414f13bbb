//! Context Construction
//!
//! Turns the conversation and summary stores into the single context string a
//! prompt builder prepends to the next prompt. Two operations are offered:
//!
//! - [`ContextBuilder::build`]: summary-backed context with retry and fallback.
//! - [`select_recent`]: cheap recency-window context that never summarizes.

pub mod builder;
pub mod recent;

pub use builder::ContextBuilder;
pub use recent::{select_recent, RecentBudget};

use crate::memory::Turn;

/// Prefix of every summary-backed context
pub const SUMMARY_PREFIX: &str = "Previous conversation summary: ";

/// Prefix of every recency-window context
pub const RECENT_PREFIX: &str = "Previous conversation: ";

/// Context returned when no summary can be produced or recalled
pub const NO_SUMMARY_CONTEXT: &str =
    "Previous conversation summary: No summary available - this is the first conversation.";

/// Render turns oldest first, separated by a blank line
pub fn render_transcript<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> String {
    turns
        .into_iter()
        .map(Turn::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Frame a summary as context
pub fn summary_context(summary: &str) -> String {
    format!("{}{}", SUMMARY_PREFIX, summary)
}
