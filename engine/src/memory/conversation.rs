//! Conversation Store
//!
//! Bounded, insertion-ordered log of completed (user, assistant) turns. When an
//! append would push the log past its capacity, the oldest turn is evicted
//! first, so the store always holds the most recent `capacity` turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of turns retained by the store
pub const DEFAULT_MAX_CONVERSATIONS: usize = 100;

/// One recorded exchange between the user and the assistant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,

    /// What the user said
    pub user_text: String,

    /// What the assistant replied
    pub assistant_text: String,
}

impl Turn {
    /// Create a turn stamped with the current time
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
        }
    }

    /// Render the turn with the fixed `User:`/`AI:` framing
    pub fn render(&self) -> String {
        format!("User: {}\nAI: {}", self.user_text, self.assistant_text)
    }

    /// Length of [`Turn::render`] in UTF-16 code units, the unit context
    /// budgets are measured in
    pub fn rendered_len(&self) -> usize {
        self.render().encode_utf16().count()
    }
}

/// Bounded FIFO log of turns
#[derive(Debug, Clone)]
pub struct ConversationStore {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationStore {
    /// Create a store holding up to [`DEFAULT_MAX_CONVERSATIONS`] turns
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CONVERSATIONS)
    }

    /// Create a store with a specific capacity (at least one turn is always kept)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity.min(DEFAULT_MAX_CONVERSATIONS)),
            capacity,
        }
    }

    /// Append a turn stamped with the current time, evicting the oldest if full
    pub fn record_turn(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.push(Turn::new(user_text, assistant_text));
    }

    /// Append an already-built turn, evicting the oldest if full
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);

        while self.turns.len() > self.capacity {
            self.turns.pop_front();
            tracing::debug!(
                capacity = self.capacity,
                "Conversation store full, evicted oldest turn"
            );
        }

        tracing::debug!(total = self.turns.len(), "Recorded conversation turn");
    }

    /// Iterate over turns, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> + ExactSizeIterator {
        self.turns.iter()
    }

    /// Owned copy of all turns, oldest first
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// The most recently recorded turn
    pub fn latest(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove every turn. Calling this on an empty store is a no-op.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
