//! Context Builder
//!
//! Produces exactly one context string per request. Rules are evaluated in
//! order and the first one that yields text wins:
//!
//! 1. No turns recorded: empty string.
//! 2. Render every turn into one transcript.
//! 3. Make sure the summarization gateway is ready.
//! 4. If ready, summarize the transcript. On failure, reinitialize the gateway
//!    and try exactly once more. A successful summary is recorded in the
//!    summary store and returned.
//! 5. Otherwise reuse the latest recorded summary.
//! 6. Otherwise return [`NO_SUMMARY_CONTEXT`].
//!
//! Summarization errors are logged and absorbed here; `build` cannot fail.

use crate::memory::{ConversationStore, SummaryStore};
use crate::summarizer::{GatewayState, SummarizationGateway, SummarizerCapability};

use super::recent::{select_recent, RecentBudget};
use super::{render_transcript, summary_context, NO_SUMMARY_CONTEXT};

#[derive(Debug)]
pub struct ContextBuilder {
    gateway: SummarizationGateway,
    recent_budget: RecentBudget,
}

impl ContextBuilder {
    pub fn new(capability: SummarizerCapability, recent_budget: RecentBudget) -> Self {
        Self {
            gateway: SummarizationGateway::new(capability),
            recent_budget,
        }
    }

    pub fn gateway(&self) -> &SummarizationGateway {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut SummarizationGateway {
        &mut self.gateway
    }

    pub fn recent_budget(&self) -> RecentBudget {
        self.recent_budget
    }

    /// Build summary-backed context, recording any fresh summary in `summaries`
    #[tracing::instrument(
        name = "build_context",
        skip_all,
        fields(turns = conversations.len(), summaries = summaries.len())
    )]
    pub async fn build(
        &mut self,
        conversations: &ConversationStore,
        summaries: &mut SummaryStore,
    ) -> String {
        if conversations.is_empty() {
            tracing::debug!("No conversations recorded, returning empty context");
            return String::new();
        }

        let transcript = render_transcript(conversations.iter());
        tracing::debug!(transcript_chars = transcript.len(), "Rendered conversation transcript");

        if let Some(summary) = self.summarize_with_retry(&transcript).await {
            summaries.record_summary(summary.as_str(), conversations.len());
            return summary_context(&summary);
        }

        if let Some(latest) = summaries.latest() {
            tracing::warn!("Summarization unavailable, reusing previous summary");
            return summary_context(&latest.summary_text);
        }

        tracing::error!("No summarization available and no previous summary found");
        NO_SUMMARY_CONTEXT.to_string()
    }

    /// Build recency-window context without touching the summarizer
    pub fn build_recent(&self, conversations: &ConversationStore) -> String {
        select_recent(conversations, self.recent_budget)
    }

    /// At most two summarize calls: one on the current handle, one after a
    /// forced reinitialization.
    async fn summarize_with_retry(&mut self, transcript: &str) -> Option<String> {
        if self.gateway.ensure_ready().await != GatewayState::Ready {
            return None;
        }

        match self.gateway.summarize(transcript).await {
            Ok(summary) => {
                tracing::info!(summary_chars = summary.len(), "Summarization successful");
                return Some(summary);
            }
            Err(e) => tracing::warn!("Summarization failed, retrying: {}", e),
        }

        if self.gateway.reinitialize().await != GatewayState::Ready {
            return None;
        }

        match self.gateway.summarize(transcript).await {
            Ok(summary) => {
                tracing::info!(summary_chars = summary.len(), "Retry summarization successful");
                Some(summary)
            }
            Err(e) => {
                tracing::warn!("Summarization retry failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SUMMARY_PREFIX;
    use crate::summarizer::{Summarizer, SummarizerError, SummarizerFactory};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Summarizer whose calls fail until the shared counter reaches `fail_first`
    struct CountingSummarizer {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        async fn summarize(&self, _text: &str) -> crate::summarizer::Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err(SummarizerError::Failure(format!("call {} failed", n)))
            } else {
                Ok("they talked about the weather".to_string())
            }
        }
    }

    /// Factory whose `create` succeeds `max_creates` times, then fails
    struct CountingFactory {
        creates: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
        fail_first: usize,
        max_creates: usize,
    }

    #[async_trait]
    impl SummarizerFactory for CountingFactory {
        fn name(&self) -> &str {
            "counting"
        }

        async fn create(&self) -> crate::summarizer::Result<Box<dyn Summarizer>> {
            if self.creates.fetch_add(1, Ordering::SeqCst) >= self.max_creates {
                return Err(SummarizerError::Unavailable("backend went away".into()));
            }
            Ok(Box::new(CountingSummarizer {
                calls: self.calls.clone(),
                fail_first: self.fail_first,
            }))
        }
    }

    struct Harness {
        builder: ContextBuilder,
        creates: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    fn harness(fail_first: usize) -> Harness {
        harness_with_creates(fail_first, usize::MAX)
    }

    fn harness_with_creates(fail_first: usize, max_creates: usize) -> Harness {
        let creates = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let capability = SummarizerCapability::present(CountingFactory {
            creates: creates.clone(),
            calls: calls.clone(),
            fail_first,
            max_creates,
        });
        Harness {
            builder: ContextBuilder::new(capability, RecentBudget::default()),
            creates,
            calls,
        }
    }

    fn one_turn() -> ConversationStore {
        let mut store = ConversationStore::new();
        store.record_turn("What's the weather?", "Sunny.");
        store
    }

    #[tokio::test]
    async fn test_empty_conversation_skips_summarizer() {
        let mut h = harness(0);
        let mut summaries = SummaryStore::new();

        let context = h.builder.build(&ConversationStore::new(), &mut summaries).await;

        assert_eq!(context, "");
        assert_eq!(h.creates.load(Ordering::SeqCst), 0);
        assert_eq!(h.builder.gateway().state(), GatewayState::Uninitialized);
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let mut h = harness(0);
        let mut summaries = SummaryStore::new();

        let context = h.builder.build(&one_turn(), &mut summaries).await;

        assert_eq!(context, "Previous conversation summary: they talked about the weather");
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries.latest().unwrap().source_turn_count, 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_reinitializes_once() {
        let mut h = harness(1);
        let mut summaries = SummaryStore::new();

        let context = h.builder.build(&one_turn(), &mut summaries).await;

        assert!(context.starts_with(SUMMARY_PREFIX));
        assert_eq!(summaries.len(), 1);
        assert_eq!(h.creates.load(Ordering::SeqCst), 2);
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_two_failures_fall_back_to_history() {
        let mut h = harness(usize::MAX);
        let mut summaries = SummaryStore::new();
        summaries.record_summary("S1", 3);

        let context = h.builder.build(&one_turn(), &mut summaries).await;

        assert_eq!(context, "Previous conversation summary: S1");
        assert_eq!(summaries.len(), 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_reinitialize_skips_retry_and_uses_history() {
        let mut h = harness_with_creates(usize::MAX, 1);
        let mut summaries = SummaryStore::new();
        summaries.record_summary("S1", 3);

        let context = h.builder.build(&one_turn(), &mut summaries).await;

        assert_eq!(context, "Previous conversation summary: S1");
        assert_eq!(summaries.len(), 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.creates.load(Ordering::SeqCst), 2);
        assert_eq!(h.builder.gateway().state(), GatewayState::Unavailable);
    }

    #[tokio::test]
    async fn test_failed_reinitialize_without_history() {
        let mut h = harness_with_creates(usize::MAX, 1);
        let mut summaries = SummaryStore::new();

        let context = h.builder.build(&one_turn(), &mut summaries).await;

        assert_eq!(context, NO_SUMMARY_CONTEXT);
        assert!(summaries.is_empty());
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.builder.gateway().state(), GatewayState::Unavailable);
    }

    #[tokio::test]
    async fn test_absent_capability_without_history() {
        let mut builder = ContextBuilder::new(SummarizerCapability::Absent, RecentBudget::default());
        let mut summaries = SummaryStore::new();

        let context = builder.build(&one_turn(), &mut summaries).await;

        assert_eq!(context, NO_SUMMARY_CONTEXT);
        assert!(summaries.is_empty());
    }

    #[tokio::test]
    async fn test_build_recent_uses_budget() {
        let builder = ContextBuilder::new(
            SummarizerCapability::Absent,
            RecentBudget {
                max_chars: 400,
                max_turns: 1,
            },
        );
        let mut store = ConversationStore::new();
        store.record_turn("a", "b");
        store.record_turn("c", "d");

        assert_eq!(builder.build_recent(&store), "Previous conversation: User: c\nAI: d");
    }
}
