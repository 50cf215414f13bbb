//! Conversation Memory
//!
//! Keeps a bounded window of recent turns plus a bounded history of summaries,
//! and turns them into context for the next prompt. One `ConversationMemory`
//! is one conversation session; callers own their instance and may run several
//! side by side.
//!
//! All operations run on the caller's task. The only suspension points are the
//! summarizer construction and summarize calls inside [`ConversationMemory::get_context`].

use crate::config::MemoryConfig;
use crate::context::{ContextBuilder, RecentBudget};
use crate::summarizer::{GatewayState, SummarizerCapability};

pub mod conversation;
pub mod summary;

pub use conversation::{ConversationStore, Turn, DEFAULT_MAX_CONVERSATIONS};
pub use summary::{SummaryRecord, SummaryStore, DEFAULT_MAX_SUMMARIES};

/// Text used by [`ConversationMemory::test_summarization`]
const PROBE_TEXT: &str = "This is a test conversation. User asked about the weather. \
AI responded that it's sunny today. User then asked about the time. AI said it's 3 PM.";

/// Conversation memory for a single session
#[derive(Debug)]
pub struct ConversationMemory {
    conversations: ConversationStore,
    summaries: SummaryStore,
    builder: ContextBuilder,
}

impl ConversationMemory {
    /// Create a memory with default capacities and budgets
    pub fn new(capability: SummarizerCapability) -> Self {
        Self::with_config(capability, &MemoryConfig::default())
    }

    /// Create a memory with capacities and budgets from the `[memory]` section
    pub fn with_config(capability: SummarizerCapability, config: &MemoryConfig) -> Self {
        Self {
            conversations: ConversationStore::with_capacity(config.max_conversations),
            summaries: SummaryStore::with_capacity(config.max_summaries),
            builder: ContextBuilder::new(capability, config.recent_budget()),
        }
    }

    /// Record a completed exchange
    pub fn record_turn(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.conversations.record_turn(user_text, assistant_text);
    }

    /// Summary-backed context for the next prompt. Never fails.
    pub async fn get_context(&mut self) -> String {
        self.builder
            .build(&self.conversations, &mut self.summaries)
            .await
    }

    /// Recency-window context for callers that skip summarization
    pub fn get_fallback_context(&self) -> String {
        self.builder.build_recent(&self.conversations)
    }

    /// Check the summarizer end to end with a fixed probe text.
    ///
    /// Returns `None` when the summarizer is unavailable or the call fails.
    /// Neither store is modified.
    pub async fn test_summarization(&mut self) -> Option<String> {
        let gateway = self.builder.gateway_mut();
        if gateway.ensure_ready().await != GatewayState::Ready {
            tracing::error!("Summarizer not available for testing");
            return None;
        }

        match gateway.summarize(PROBE_TEXT).await {
            Ok(summary) => {
                tracing::info!("Test summarization result: {}", summary);
                Some(summary)
            }
            Err(e) => {
                tracing::error!("Test summarization failed: {}", e);
                None
            }
        }
    }

    pub fn clear_conversations(&mut self) {
        self.conversations.clear();
    }

    pub fn clear_summary_history(&mut self) {
        self.summaries.clear();
    }

    pub fn clear_all_history(&mut self) {
        self.conversations.clear();
        self.summaries.clear();
    }

    /// Snapshot of recorded turns, oldest first
    pub fn get_conversations(&self) -> Vec<Turn> {
        self.conversations.snapshot()
    }

    /// Snapshot of recorded summaries, oldest first
    pub fn get_summary_history(&self) -> Vec<SummaryRecord> {
        self.summaries.snapshot()
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn summaries(&self) -> &SummaryStore {
        &self.summaries
    }

    pub fn summarizer_state(&self) -> GatewayState {
        self.builder.gateway().state()
    }

    pub fn recent_budget(&self) -> RecentBudget {
        self.builder.recent_budget()
    }
}
