//! Recall Engine Library
//!
//! Conversation memory and context construction for token-limited assistants.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Conversation and summary stores
pub mod memory;

/// Summarization capability and gateway
pub mod summarizer;

/// Context construction policy
pub mod context;

/// LLM provider abstraction layer
pub mod llm;

/// Prompt orchestration around a conversation memory
pub mod session;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
