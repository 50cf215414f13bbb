//! Error types and handling
//!
//! This module provides the error types used at the edges of the Recall engine
//! (configuration loading, provider wiring, terminal IO). All errors implement
//! the `RecallErrorExt` trait which provides user-friendly hints and indicates
//! whether errors are recoverable.
//!
//! Failures of the summarization capability never show up here: they are
//! absorbed by the context builder and only ever degrade the context text.

use thiserror::Error;

/// Trait for Recall error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait RecallErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require fixing the configuration or environment first.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RecallErrorExt};
///
/// let error = EngineError::ResponderUnavailable("ollama".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal_error = EngineError::Config("bad log level".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Response model errors
    #[error("Responder unavailable: {0}")]
    ResponderUnavailable(String),

    #[error("Responder error: {0}")]
    Responder(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecallErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::ResponderUnavailable(_) => {
                "The response model is unavailable. Make sure the model server is running"
            }
            Self::Responder(_) => "The response model failed. Try again in a few moments",
            Self::Serialization(_) => "Failed to format output",
            Self::Io(_) => "Terminal or file system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
