//! Configuration management
//!
//! This module handles loading, validation, and management of the Recall
//! configuration. Configuration is stored in TOML format at ~/.recall/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **memory**: Store capacities and the recency-window budget
//! - **summarizer**: Summarization capability (Ollama) settings
//! - **responder**: Response model settings and prompt shaping
//!
//! Every section is optional; missing sections and fields take their defaults.
//!
//! # Examples
//!
//! ```no_run
//! use recall_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Keeping {} turns", config.memory.max_conversations);
//! println!("Summarizer model: {}", config.summarizer.model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::recent::{DEFAULT_RECENT_MAX_CHARS, DEFAULT_RECENT_MAX_TURNS};
use crate::context::RecentBudget;
use crate::memory::{DEFAULT_MAX_CONVERSATIONS, DEFAULT_MAX_SUMMARIES};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Conversation memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Summarization capability settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Response model settings
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Memory system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of turns kept in the conversation store
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,

    /// Maximum number of summaries kept in the summary store
    #[serde(default = "default_max_summaries")]
    pub max_summaries: usize,

    /// Character budget of the recency-window context
    #[serde(default = "default_fallback_max_chars")]
    pub fallback_max_chars: usize,

    /// Turn cap of the recency-window context
    #[serde(default = "default_fallback_max_turns")]
    pub fallback_max_turns: usize,
}

impl MemoryConfig {
    pub fn recent_budget(&self) -> RecentBudget {
        RecentBudget {
            max_chars: self.fallback_max_chars,
            max_turns: self.fallback_max_turns,
        }
    }
}

/// Summarizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// When false the summarization capability is treated as absent
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,
}

/// How the session builds context before each prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Summarize the whole conversation (with fallbacks)
    Summary,
    /// Use the newest turns that fit the recency budget
    Recent,
}

/// Response model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Reply length the prompt asks the model to stay within
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,

    /// Context construction mode
    #[serde(default = "default_context_mode")]
    pub context_mode: ContextMode,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_conversations() -> usize {
    DEFAULT_MAX_CONVERSATIONS
}

fn default_max_summaries() -> usize {
    DEFAULT_MAX_SUMMARIES
}

fn default_fallback_max_chars() -> usize {
    DEFAULT_RECENT_MAX_CHARS
}

fn default_fallback_max_turns() -> usize {
    DEFAULT_RECENT_MAX_TURNS
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_summarizer_timeout() -> u64 {
    120
}

fn default_max_reply_chars() -> usize {
    20
}

fn default_context_mode() -> ContextMode {
    ContextMode::Summary
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_conversations: default_max_conversations(),
            max_summaries: default_max_summaries(),
            fallback_max_chars: default_fallback_max_chars(),
            fallback_max_turns: default_fallback_max_turns(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            timeout_secs: default_summarizer_timeout(),
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
            max_reply_chars: default_max_reply_chars(),
            context_mode: default_context_mode(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.recall/config.toml)
    ///
    /// If the configuration file doesn't exist, a default one is written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path (supports ~ expansion)
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let path = expand_path(path)?;
        let contents = fs::read_to_string(&path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Serialize the configuration as pretty TOML
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Write the default configuration to `path`, creating parent directories
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();
        config.validate()?;

        fs::write(path, config.to_toml_string()?)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.recall/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".recall").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.memory.max_conversations == 0 {
            return Err(EngineError::Config(
                "memory.max_conversations must be at least 1".to_string(),
            ));
        }
        if self.memory.max_summaries == 0 {
            return Err(EngineError::Config(
                "memory.max_summaries must be at least 1".to_string(),
            ));
        }
        if self.memory.fallback_max_turns == 0 {
            return Err(EngineError::Config(
                "memory.fallback_max_turns must be at least 1".to_string(),
            ));
        }

        if self.summarizer.model.trim().is_empty() {
            return Err(EngineError::Config(
                "summarizer.model must not be empty".to_string(),
            ));
        }
        if self.responder.model.trim().is_empty() {
            return Err(EngineError::Config(
                "responder.model must not be empty".to_string(),
            ));
        }
        if self.responder.max_reply_chars == 0 {
            return Err(EngineError::Config(
                "responder.max_reply_chars must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
