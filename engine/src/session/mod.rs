//! Conversation Session
//!
//! The prompt-issuing side of the system. A session owns one
//! [`ConversationMemory`], asks it for context before every prompt, sends the
//! prompt to the response model, hands the reply to a [`ReplySink`], and
//! records the completed turn.
//!
//! A failed model call delivers a user-facing failure sentence to the sink,
//! records nothing, and returns the error so the caller can stop its input loop.

use std::sync::Arc;

use crate::config::{ContextMode, ResponderConfig};
use crate::llm::{LLMError, LLMProvider, Message};
use crate::memory::ConversationMemory;

pub mod prompt;
pub mod reply;

pub use prompt::build_prompt;
pub use reply::{describe_failure, BufferSink, ReplySink, StdoutSink};

/// Prompt shaping options for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Reply length the prompt asks the model to stay within
    pub max_reply_chars: usize,

    /// How context is built before each prompt
    pub context_mode: ContextMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ResponderConfig::default())
    }
}

impl From<&ResponderConfig> for SessionOptions {
    fn from(config: &ResponderConfig) -> Self {
        Self {
            max_reply_chars: config.max_reply_chars,
            context_mode: config.context_mode,
        }
    }
}

pub struct ConversationSession {
    memory: ConversationMemory,
    responder: Arc<dyn LLMProvider>,
    sink: Arc<dyn ReplySink>,
    options: SessionOptions,
}

impl ConversationSession {
    pub fn new(
        memory: ConversationMemory,
        responder: Arc<dyn LLMProvider>,
        sink: Arc<dyn ReplySink>,
        options: SessionOptions,
    ) -> Self {
        Self {
            memory,
            responder,
            sink,
            options,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ConversationMemory {
        &mut self.memory
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Context for the next prompt according to the configured mode
    pub async fn context(&mut self) -> String {
        match self.options.context_mode {
            ContextMode::Summary => self.memory.get_context().await,
            ContextMode::Recent => self.memory.get_fallback_context(),
        }
    }

    /// Answer one user utterance.
    ///
    /// Blank input is ignored and yields an empty reply without calling the model.
    #[tracing::instrument(name = "respond", skip_all, fields(responder = self.responder.name()))]
    pub async fn respond(&mut self, user_text: &str) -> Result<String, LLMError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            tracing::debug!("Ignoring empty user input");
            return Ok(String::new());
        }

        let context = self.context().await;
        let prompt = build_prompt(&context, user_text, self.options.max_reply_chars);
        tracing::debug!(
            context_chars = context.len(),
            prompt_chars = prompt.len(),
            "Built prompt"
        );

        match self.responder.generate(&[Message::user(prompt)]).await {
            Ok(reply) => {
                self.sink.deliver(&reply);
                self.memory.record_turn(user_text, reply.as_str());
                Ok(reply)
            }
            Err(e) => {
                tracing::error!("Error interacting with the response model: {}", e);
                self.sink.deliver(describe_failure(&e));
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("memory", &self.memory)
            .field("responder", &self.responder.name())
            .field("options", &self.options)
            .finish()
    }
}
