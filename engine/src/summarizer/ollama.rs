//! Ollama Summarizer
//!
//! Summarization capability backed by a local Ollama server.
//!
//! - `create()` probes `GET /api/tags` and checks that the configured model is
//!   installed. An unreachable server or missing model means the capability is
//!   unavailable.
//! - `summarize()` posts a non-streaming request to `POST /api/generate`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Result, Summarizer, SummarizerError, SummarizerFactory};

/// Instruction prepended to every conversation sent for summarization
const SUMMARY_INSTRUCTION: &str = "Summarize the following conversation between a user and an AI assistant in a few sentences. \
Keep the facts, the user's current goals, and any open questions. Reply with the summary only.";

/// Factory that constructs [`OllamaSummarizer`] handles
#[derive(Debug, Clone)]
pub struct OllamaSummarizerFactory {
    /// Base URL for Ollama API (typically http://localhost:11434)
    base_url: String,

    /// Model used for summarization (e.g., "llama3.1:8b")
    model: String,

    /// HTTP client shared with constructed handles
    client: Client,
}

impl OllamaSummarizerFactory {
    /// Create a factory for the given server and model
    ///
    /// `timeout` bounds each HTTP request made by this factory and its handles.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SummarizerFactory for OllamaSummarizerFactory {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn create(&self) -> Result<Box<dyn Summarizer>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                SummarizerError::Unavailable(format!(
                    "Cannot connect to Ollama at {}. Is Ollama running?",
                    self.base_url
                ))
            } else {
                SummarizerError::Unavailable(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(SummarizerError::Unavailable(format!(
                "Ollama API error ({})",
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            SummarizerError::Unavailable(format!("Failed to parse Ollama model list: {}", e))
        })?;

        if !tags.models.iter().any(|m| model_matches(&m.name, &self.model)) {
            return Err(SummarizerError::Unavailable(format!(
                "Model '{}' is not installed in Ollama",
                self.model
            )));
        }

        Ok(Box::new(OllamaSummarizer {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            client: self.client.clone(),
        }))
    }
}

/// Summarizer handle bound to one Ollama server and model
#[derive(Debug, Clone)]
pub struct OllamaSummarizer {
    base_url: String,
    model: String,
    client: Client,
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: format!("{}\n\n{}", SUMMARY_INSTRUCTION, text),
            stream: false,
        };

        tracing::debug!(
            "Ollama summarize request: model={}, input_chars={}",
            self.model,
            text.len()
        );

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizerError::Failure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Failure(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            SummarizerError::Failure(format!("Failed to parse Ollama response: {}", e))
        })?;

        let summary = body.response.trim();
        if summary.is_empty() {
            return Err(SummarizerError::Failure(
                "Ollama returned an empty summary".to_string(),
            ));
        }

        Ok(summary.to_string())
    }
}

/// Ollama reports untagged models as `name:latest`
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || (!wanted.contains(':') && installed.strip_suffix(":latest") == Some(wanted))
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
struct TagsModel {
    name: String,
}
