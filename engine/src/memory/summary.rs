//! Summary Store
//!
//! Bounded log of summaries produced by the summarization capability. The
//! newest record is the one the context builder falls back on when a fresh
//! summary cannot be produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of summaries retained by the store
pub const DEFAULT_MAX_SUMMARIES: usize = 10;

/// A summary together with the conversation size it was produced from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryRecord {
    /// When the summary was produced
    pub timestamp: DateTime<Utc>,

    /// The summary text returned by the summarizer
    pub summary_text: String,

    /// Number of turns in the conversation store when the summary was made
    pub source_turn_count: usize,
}

impl SummaryRecord {
    pub fn new(summary_text: impl Into<String>, source_turn_count: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            summary_text: summary_text.into(),
            source_turn_count,
        }
    }
}

/// Bounded FIFO log of summaries
#[derive(Debug, Clone)]
pub struct SummaryStore {
    records: VecDeque<SummaryRecord>,
    capacity: usize,
}

impl SummaryStore {
    /// Create a store holding up to [`DEFAULT_MAX_SUMMARIES`] records
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SUMMARIES)
    }

    /// Create a store with a specific capacity (at least one record is always kept)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_MAX_SUMMARIES)),
            capacity,
        }
    }

    /// Append a summary, evicting the oldest record if full
    pub fn record_summary(&mut self, summary_text: impl Into<String>, source_turn_count: usize) {
        self.records
            .push_back(SummaryRecord::new(summary_text, source_turn_count));

        while self.records.len() > self.capacity {
            self.records.pop_front();
        }

        tracing::debug!(
            total = self.records.len(),
            source_turn_count,
            "Recorded summary"
        );
    }

    /// The most recently appended record
    pub fn latest(&self) -> Option<&SummaryRecord> {
        self.records.back()
    }

    /// Iterate over records, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SummaryRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Owned copy of all records, oldest first
    pub fn snapshot(&self) -> Vec<SummaryRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for SummaryStore {
    fn default() -> Self {
        Self::new()
    }
}
