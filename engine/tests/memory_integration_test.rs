//! Integration tests for conversation memory
//!
//! These tests drive `ConversationMemory` through its public API with fake
//! summarization capabilities covering every branch of the context policy.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use recall_engine::config::MemoryConfig;
use recall_engine::context::NO_SUMMARY_CONTEXT;
use recall_engine::memory::ConversationMemory;
use recall_engine::summarizer::{
    GatewayState, Result, Summarizer, SummarizerCapability, SummarizerError, SummarizerFactory,
};

/// Scripted outcomes shared by every handle a factory creates
type Script = Arc<Mutex<VecDeque<Result<String>>>>;

struct ScriptedSummarizer {
    script: Script,
    inputs: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        self.inputs.lock().unwrap().push(text.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SummarizerError::Failure("script exhausted".into())))
    }
}

struct ScriptedFactory {
    script: Script,
    inputs: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SummarizerFactory for ScriptedFactory {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create(&self) -> Result<Box<dyn Summarizer>> {
        Ok(Box::new(ScriptedSummarizer {
            script: self.script.clone(),
            inputs: self.inputs.clone(),
        }))
    }
}

struct AlwaysSucceeds;

#[async_trait]
impl Summarizer for AlwaysSucceeds {
    async fn summarize(&self, _text: &str) -> Result<String> {
        Ok("The user asked about the weather.".to_string())
    }
}

struct AlwaysSucceedsFactory;

#[async_trait]
impl SummarizerFactory for AlwaysSucceedsFactory {
    fn name(&self) -> &str {
        "always"
    }

    async fn create(&self) -> Result<Box<dyn Summarizer>> {
        Ok(Box::new(AlwaysSucceeds))
    }
}

struct NeverConstructs;

#[async_trait]
impl SummarizerFactory for NeverConstructs {
    fn name(&self) -> &str {
        "broken"
    }

    async fn create(&self) -> Result<Box<dyn Summarizer>> {
        Err(SummarizerError::Unavailable("backend missing".into()))
    }
}

fn scripted(outcomes: Vec<Result<String>>) -> (SummarizerCapability, Arc<Mutex<Vec<String>>>) {
    let inputs = Arc::new(Mutex::new(Vec::new()));
    let capability = SummarizerCapability::present(ScriptedFactory {
        script: Arc::new(Mutex::new(outcomes.into_iter().collect())),
        inputs: inputs.clone(),
    });
    (capability, inputs)
}

fn fail(msg: &str) -> Result<String> {
    Err(SummarizerError::Failure(msg.to_string()))
}

#[tokio::test]
async fn test_capacity_bound_keeps_newest_turns() {
    let config = MemoryConfig {
        max_conversations: 100,
        ..Default::default()
    };
    let mut memory = ConversationMemory::with_config(SummarizerCapability::Absent, &config);

    for i in 1..=130 {
        memory.record_turn(format!("question {}", i), format!("answer {}", i));
    }

    let turns = memory.get_conversations();
    assert_eq!(turns.len(), 100);
    // oldest retained is the (130 - 100 + 1) = 31st inserted
    assert_eq!(turns[0].user_text, "question 31");
    assert_eq!(turns[99].user_text, "question 130");
}

#[tokio::test]
async fn test_summary_capacity_bound() {
    let (capability, _) = scripted((1..=13).map(|i| Ok(format!("S{}", i))).collect());
    let mut memory = ConversationMemory::new(capability);
    memory.record_turn("hello", "hi");

    for _ in 0..13 {
        memory.get_context().await;
    }

    let history = memory.get_summary_history();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].summary_text, "S4");
    assert_eq!(history[9].summary_text, "S13");
}

#[tokio::test]
async fn test_empty_store_context_is_empty() {
    let mut memory = ConversationMemory::new(SummarizerCapability::present(AlwaysSucceedsFactory));

    assert_eq!(memory.get_context().await, "");
    assert!(memory.get_summary_history().is_empty());
    assert_eq!(memory.summarizer_state(), GatewayState::Uninitialized);
}

#[tokio::test]
async fn test_successful_summarization() {
    let mut memory = ConversationMemory::new(SummarizerCapability::present(AlwaysSucceedsFactory));
    memory.record_turn("What's the weather?", "Sunny.");
    memory.record_turn("And the time?", "3 PM.");

    let context = memory.get_context().await;

    assert_eq!(
        context,
        "Previous conversation summary: The user asked about the weather."
    );
    let history = memory.get_summary_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source_turn_count, 2);
}

#[tokio::test]
async fn test_summarizer_receives_full_transcript() {
    let (capability, inputs) = scripted(vec![Ok("S".to_string())]);
    let mut memory = ConversationMemory::new(capability);
    memory.record_turn("a", "b");
    memory.record_turn("c", "d");

    memory.get_context().await;

    assert_eq!(
        inputs.lock().unwrap().as_slice(),
        ["User: a\nAI: b\n\nUser: c\nAI: d"]
    );
}

#[tokio::test]
async fn test_retry_then_success_records_once() {
    let (capability, inputs) = scripted(vec![fail("transient"), Ok("Recovered".to_string())]);
    let mut memory = ConversationMemory::new(capability);
    memory.record_turn("hello", "hi");

    let context = memory.get_context().await;

    assert_eq!(context, "Previous conversation summary: Recovered");
    assert_eq!(memory.get_summary_history().len(), 1);
    assert_eq!(inputs.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_full_failure_with_history_uses_latest() {
    let (capability, inputs) = scripted(vec![Ok("S1".to_string())]);
    let mut memory = ConversationMemory::new(capability);
    memory.record_turn("hello", "hi");

    // first call succeeds and seeds the history; the script is then exhausted
    assert_eq!(memory.get_context().await, "Previous conversation summary: S1");

    memory.record_turn("more", "text");
    let context = memory.get_context().await;

    assert_eq!(context, "Previous conversation summary: S1");
    assert_eq!(memory.get_summary_history().len(), 1);
    // one success, then exactly two failed attempts
    assert_eq!(inputs.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_full_failure_without_history() {
    let (capability, _) = scripted(vec![fail("down"), fail("still down")]);
    let mut memory = ConversationMemory::new(capability);
    memory.record_turn("hello", "hi");

    let context = memory.get_context().await;

    assert_eq!(
        context,
        "Previous conversation summary: No summary available - this is the first conversation."
    );
    assert_eq!(context, NO_SUMMARY_CONTEXT);
    assert!(memory.get_summary_history().is_empty());
}

#[tokio::test]
async fn test_construction_failure_falls_back() {
    let mut memory = ConversationMemory::new(SummarizerCapability::present(NeverConstructs));
    memory.record_turn("hello", "hi");

    assert_eq!(memory.get_context().await, NO_SUMMARY_CONTEXT);
    assert_eq!(memory.summarizer_state(), GatewayState::Unavailable);
}

#[tokio::test]
async fn test_fallback_context_budget() {
    let mut memory = ConversationMemory::new(SummarizerCapability::Absent);
    // "User: qN\nAI: " is 13 chars, so a 37-char reply renders to 50 chars
    for i in 0..6 {
        memory.record_turn(format!("q{}", i), "r".repeat(37));
    }

    let expected_body = (1..6)
        .map(|i| format!("User: q{}\nAI: {}", i, "r".repeat(37)))
        .collect::<Vec<_>>()
        .join("\n");

    assert_eq!(
        memory.get_fallback_context(),
        format!("Previous conversation: {}", expected_body)
    );
}

#[tokio::test]
async fn test_fallback_minimum_one_turn() {
    let mut memory = ConversationMemory::new(SummarizerCapability::Absent);
    let long_reply = "z".repeat(500);
    memory.record_turn("tell me everything", long_reply.as_str());

    assert_eq!(
        memory.get_fallback_context(),
        format!("Previous conversation: User: tell me everything\nAI: {}", long_reply)
    );
}

#[tokio::test]
async fn test_fallback_context_empty_store() {
    let memory = ConversationMemory::new(SummarizerCapability::Absent);
    assert_eq!(memory.get_fallback_context(), "");
}

#[tokio::test]
async fn test_clear_operations_are_independent() {
    let mut memory = ConversationMemory::new(SummarizerCapability::present(AlwaysSucceedsFactory));
    memory.record_turn("hello", "hi");
    memory.get_context().await;

    memory.clear_conversations();
    assert!(memory.get_conversations().is_empty());
    assert_eq!(memory.get_summary_history().len(), 1);

    memory.record_turn("again", "sure");
    memory.clear_summary_history();
    assert!(memory.get_summary_history().is_empty());
    assert_eq!(memory.get_conversations().len(), 1);

    memory.get_context().await;
    memory.clear_all_history();
    assert!(memory.get_conversations().is_empty());
    assert!(memory.get_summary_history().is_empty());
}

#[tokio::test]
async fn test_probe_does_not_touch_stores() {
    let mut memory = ConversationMemory::new(SummarizerCapability::present(AlwaysSucceedsFactory));

    let summary = memory.test_summarization().await;

    assert_eq!(summary.as_deref(), Some("The user asked about the weather."));
    assert!(memory.get_conversations().is_empty());
    assert!(memory.get_summary_history().is_empty());
}

#[tokio::test]
async fn test_independent_sessions() {
    let mut first = ConversationMemory::new(SummarizerCapability::Absent);
    let second = ConversationMemory::new(SummarizerCapability::Absent);

    first.record_turn("only in first", "yes");

    assert_eq!(first.get_conversations().len(), 1);
    assert!(second.get_conversations().is_empty());
}
