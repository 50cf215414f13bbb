//! Recall SDK
//!
//! Shared library providing error types for Recall components.
//! This crate is used by the engine and by any front-end embedding it.

/// Error types and handling
pub mod errors;

// Re-export commonly used types
pub use errors::{EngineError, RecallErrorExt};
