//! Summarization Capability
//!
//! The summarizer is an external, possibly-missing service. It is modeled as a
//! capability with two variants:
//!
//! - `Present`: a factory that can be asked to `create()` a summarizer handle.
//!   Construction may fail, and each `summarize` call on the handle may fail.
//! - `Absent`: the environment has no summarizer at all.
//!
//! The [`SummarizationGateway`] wraps the capability and owns lazy
//! (re-)initialization of the handle.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SummarizerConfig;

pub mod gateway;
pub mod ollama;

pub use gateway::{GatewayState, SummarizationGateway};

/// Result type for summarization operations
pub type Result<T> = std::result::Result<T, SummarizerError>;

/// Errors raised by the summarization capability
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummarizerError {
    /// The capability is absent or could not be constructed
    #[error("Summarizer unavailable: {0}")]
    Unavailable(String),

    /// The capability exists but a summarize call failed
    #[error("Summarization failed: {0}")]
    Failure(String),
}

/// A constructed summarizer that can condense arbitrary text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` into a shorter passage
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Constructor side of the summarization capability
#[async_trait]
pub trait SummarizerFactory: Send + Sync {
    /// Short name used in logs (e.g. "ollama")
    fn name(&self) -> &str;

    /// Construct a usable summarizer handle
    async fn create(&self) -> Result<Box<dyn Summarizer>>;
}

/// Whether the runtime environment offers a summarizer at all
#[derive(Clone)]
pub enum SummarizerCapability {
    Present(Arc<dyn SummarizerFactory>),
    Absent,
}

impl SummarizerCapability {
    /// Wrap a factory as a present capability
    pub fn present(factory: impl SummarizerFactory + 'static) -> Self {
        Self::Present(Arc::new(factory))
    }

    /// Build the capability described by the `[summarizer]` config section
    pub fn from_config(config: &SummarizerConfig) -> Self {
        if !config.enabled {
            return Self::Absent;
        }

        Self::present(ollama::OllamaSummarizerFactory::new(
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl std::fmt::Debug for SummarizerCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present(factory) => write!(f, "Present({})", factory.name()),
            Self::Absent => write!(f, "Absent"),
        }
    }
}
