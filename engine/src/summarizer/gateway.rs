//! Summarization Gateway
//!
//! Mediates access to the summarization capability:
//!
//! ```text
//! Uninitialized --probe ok--> Ready
//! Uninitialized --absent / create fails--> Unavailable
//! Unavailable   --probe--> Ready | Unavailable   (re-probed on every request)
//! Ready         --reinitialize--> Ready | Unavailable
//! ```
//!
//! The gateway never gives up permanently and never demotes itself when a
//! summarize call fails; the caller decides whether to reinitialize.

use super::{Summarizer, SummarizerCapability, SummarizerError};

/// Lifecycle state of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    Uninitialized,
    Ready,
    Unavailable,
}

pub struct SummarizationGateway {
    capability: SummarizerCapability,
    handle: Option<Box<dyn Summarizer>>,
    state: GatewayState,
}

impl SummarizationGateway {
    /// Create a gateway; nothing is probed until the first `ensure_ready`
    pub fn new(capability: SummarizerCapability) -> Self {
        Self {
            capability,
            handle: None,
            state: GatewayState::Uninitialized,
        }
    }

    pub fn state(&self) -> GatewayState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == GatewayState::Ready
    }

    /// Make sure a summarizer handle exists, constructing one if needed.
    ///
    /// Never fails: construction problems leave the gateway `Unavailable`.
    pub async fn ensure_ready(&mut self) -> GatewayState {
        if self.is_ready() {
            return self.state;
        }
        self.probe().await
    }

    /// Drop the current handle and construct a fresh one
    pub async fn reinitialize(&mut self) -> GatewayState {
        self.handle = None;
        self.probe().await
    }

    /// Summarize `text` with the current handle.
    ///
    /// Fails with [`SummarizerError::Failure`] when the gateway is not ready or
    /// the underlying call fails.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            SummarizerError::Failure(format!("summarizer is not ready ({:?})", self.state))
        })?;

        match handle.summarize(text).await {
            Ok(summary) => Ok(summary),
            Err(SummarizerError::Unavailable(msg)) | Err(SummarizerError::Failure(msg)) => {
                Err(SummarizerError::Failure(msg))
            }
        }
    }

    async fn probe(&mut self) -> GatewayState {
        let factory = match &self.capability {
            SummarizerCapability::Present(factory) => factory,
            SummarizerCapability::Absent => {
                tracing::warn!("Summarizer capability is not available in this environment");
                self.handle = None;
                self.state = GatewayState::Unavailable;
                return self.state;
            }
        };

        tracing::debug!(summarizer = factory.name(), "Initializing summarizer");

        match factory.create().await {
            Ok(handle) => {
                tracing::info!(summarizer = factory.name(), "Summarizer initialized");
                self.handle = Some(handle);
                self.state = GatewayState::Ready;
            }
            Err(e) => {
                tracing::warn!(summarizer = factory.name(), "Failed to initialize summarizer: {}", e);
                self.handle = None;
                self.state = GatewayState::Unavailable;
            }
        }

        self.state
    }
}

impl std::fmt::Debug for SummarizationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizationGateway")
            .field("capability", &self.capability)
            .field("state", &self.state)
            .finish()
    }
}
