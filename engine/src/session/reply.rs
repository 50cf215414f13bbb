//! Reply delivery and user-facing failure messages

use std::sync::Mutex;

use crate::llm::LLMError;

pub const NOT_AVAILABLE_MESSAGE: &str = "The AI model is not available. Make sure the model server \
is running and the configured model is installed.";

pub const MODEL_UNAVAILABLE_MESSAGE: &str = "The AI model is currently unavailable or failed to \
initialize. It might be downloading or encountered an issue. Please try again in a few moments.";

pub const ACCESS_DENIED_MESSAGE: &str =
    "Access to the AI model was denied. Please check the server permissions.";

pub const UNKNOWN_ERROR_MESSAGE: &str =
    "An unknown error occurred with the AI model. Please try again.";

pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error with the AI model.";

/// Receives the assistant's text for display or speech
pub trait ReplySink: Send + Sync {
    fn deliver(&self, text: &str);
}

/// Prints replies to stdout, one `"{label} : {text}"` line each
#[derive(Debug, Clone)]
pub struct StdoutSink {
    label: String,
}

impl StdoutSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The line printed for `text`
    pub fn line(&self, text: &str) -> String {
        format!("{} : {}", self.label, text)
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new("AI")
    }
}

impl ReplySink for StdoutSink {
    fn deliver(&self, text: &str) {
        println!("{}", self.line(text));
    }
}

/// Collects delivered replies in memory
#[derive(Debug, Default)]
pub struct BufferSink {
    replies: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies delivered so far, oldest first
    pub fn replies(&self) -> Vec<String> {
        self.replies
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl ReplySink for BufferSink {
    fn deliver(&self, text: &str) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push(text.to_string());
        }
    }
}

/// Map a response-model error to a sentence that can be shown or spoken
pub fn describe_failure(error: &LLMError) -> &'static str {
    let text = error.to_string().to_lowercase();

    if text.contains("model availability") || text.contains("failed to initialize") {
        return MODEL_UNAVAILABLE_MESSAGE;
    }
    if matches!(error, LLMError::PermissionDenied(_)) || text.contains("denied") {
        return ACCESS_DENIED_MESSAGE;
    }

    match error {
        LLMError::ProviderUnavailable(msg) => {
            let msg = msg.to_lowercase();
            if msg.contains("not available") || msg.contains("cannot connect") {
                NOT_AVAILABLE_MESSAGE
            } else {
                MODEL_UNAVAILABLE_MESSAGE
            }
        }
        _ if text.contains("unknown error") => UNKNOWN_ERROR_MESSAGE,
        _ => GENERIC_ERROR_MESSAGE,
    }
}
