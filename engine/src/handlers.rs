//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - chat: interactive conversation on stdin
//! - probe: summarizer self-test
//! - config path / config show: configuration inspection

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::ConfigAction;
use crate::config::Config;
use crate::llm::ollama::OllamaProvider;
use crate::llm::{LLMError, LLMProvider};
use crate::memory::{ConversationMemory, SummaryRecord, Turn};
use crate::session::{ConversationSession, SessionOptions, StdoutSink};
use crate::summarizer::SummarizerCapability;
use sdk::errors::EngineError;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Whether the chat loop keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFlow {
    Continue,
    Stop,
}

const CHAT_HELP: &str = "Commands: /history, /summaries, /context, /recent, /clear, \
/clear-summaries, /clear-all, /quit";

/// Build a conversation memory from the `[memory]` and `[summarizer]` sections
pub fn build_memory(config: &Config) -> ConversationMemory {
    ConversationMemory::with_config(
        SummarizerCapability::from_config(&config.summarizer),
        &config.memory,
    )
}

/// Run an interactive chat session on stdin
pub async fn handle_chat(config: &Config, format: OutputFormat) -> Result<()> {
    let responder = Arc::new(OllamaProvider::new(
        config.responder.base_url.clone(),
        config.responder.model.clone(),
    ));

    if !responder.check_health().await {
        tracing::warn!(
            "Response model server at {} is not reachable",
            config.responder.base_url
        );
    }

    let mut session = ConversationSession::new(
        build_memory(config),
        responder,
        Arc::new(StdoutSink::default()),
        SessionOptions::from(&config.responder),
    );

    println!("Listening... ({})", CHAT_HELP);
    run_chat(&mut session, BufReader::new(tokio::io::stdin()), format).await
}

/// Drive a session from line-oriented input until EOF, `/quit`, or a model failure
pub async fn run_chat<R>(
    session: &mut ConversationSession,
    input: R,
    format: OutputFormat,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if handle_chat_command(session, command, format).await? == ChatFlow::Stop {
                break;
            }
            continue;
        }

        if let Err(e) = session.respond(line).await {
            println!("Stopped listening due to AI error: {}", e);
            return Err(responder_error(e).into());
        }
    }

    println!("Stopped listening.");
    Ok(())
}

/// Execute a `/command` typed during a chat session
pub async fn handle_chat_command(
    session: &mut ConversationSession,
    command: &str,
    format: OutputFormat,
) -> Result<ChatFlow> {
    match command.trim() {
        "quit" | "exit" => return Ok(ChatFlow::Stop),
        "history" => print_turns(&session.memory().get_conversations(), format)?,
        "summaries" => print_summaries(&session.memory().get_summary_history(), format)?,
        "context" => {
            let context = session.context().await;
            print_context(&context, format)?;
        }
        "recent" => print_context(&session.memory().get_fallback_context(), format)?,
        "clear" => {
            session.memory_mut().clear_conversations();
            println!("Conversation history cleared.");
        }
        "clear-summaries" => {
            session.memory_mut().clear_summary_history();
            println!("Summary history cleared.");
        }
        "clear-all" => {
            session.memory_mut().clear_all_history();
            println!("All history cleared.");
        }
        other => {
            println!("Unknown command '/{}'. {}", other, CHAT_HELP);
        }
    }

    Ok(ChatFlow::Continue)
}

/// Run the summarizer self-test
pub async fn handle_probe(config: &Config, format: OutputFormat) -> Result<()> {
    let mut memory = build_memory(config);
    let summary = memory.test_summarization().await;

    match format {
        OutputFormat::Text => match &summary {
            Some(summary) => println!("Summarizer OK: {}", summary),
            None => println!(
                "Summarizer not available ({}, model {})",
                config.summarizer.base_url, config.summarizer.model
            ),
        },
        OutputFormat::Json => {
            let output = json!({
                "available": summary.is_some(),
                "summary": summary,
                "state": format!("{:?}", memory.summarizer_state()),
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    Ok(())
}

/// Show the configuration location or its effective contents
pub fn handle_config(
    action: &ConfigAction,
    config: &Config,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => Config::default_config_path()?,
            };
            match format {
                OutputFormat::Text => println!("{}", path.display()),
                OutputFormat::Json => {
                    println!("{}", to_pretty_json(&json!({ "path": path }))?)
                }
            }
        }
        ConfigAction::Show => match format {
            OutputFormat::Text => print!("{}", config.to_toml_string()?),
            OutputFormat::Json => println!("{}", to_pretty_json(config)?),
        },
    }

    Ok(())
}

fn print_turns(turns: &[Turn], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if turns.is_empty() {
                println!("No conversations recorded");
                return Ok(());
            }

            println!("Conversation History ({} turns):", turns.len());
            for turn in turns {
                println!("[{}]", turn.timestamp.format("%Y-%m-%d %H:%M:%S"));
                println!("  You : {}", turn.user_text);
                println!("  AI  : {}", turn.assistant_text);
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "conversations": turns,
                "count": turns.len(),
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    Ok(())
}

fn print_summaries(records: &[SummaryRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No summaries recorded");
                return Ok(());
            }

            println!("Summary History ({} summaries):", records.len());
            for record in records {
                println!(
                    "[{}] ({} turns) {}",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.source_turn_count,
                    record.summary_text
                );
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "summaries": records,
                "count": records.len(),
            });
            println!("{}", to_pretty_json(&output)?);
        }
    }

    Ok(())
}

fn print_context(context: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text if context.is_empty() => println!("(no context)"),
        OutputFormat::Text => println!("{}", context),
        OutputFormat::Json => println!("{}", to_pretty_json(&json!({ "context": context }))?),
    }

    Ok(())
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, EngineError> {
    serde_json::to_string_pretty(value).map_err(|e| EngineError::Serialization(e.to_string()))
}

fn responder_error(error: LLMError) -> EngineError {
    match error {
        LLMError::ProviderUnavailable(msg) => EngineError::ResponderUnavailable(msg),
        other => EngineError::Responder(other.to_string()),
    }
}
