// Recall Conversation Engine
// Main entry point for the Recall binary

use clap::Parser;
use recall_engine::cli::{Cli, Command};
use recall_engine::config::Config;
use recall_engine::handlers::{handle_chat, handle_config, handle_probe, OutputFormat};
use recall_engine::telemetry::{init_telemetry, init_telemetry_with_level};
use sdk::errors::{EngineError, RecallErrorExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = match &cli.config {
        Some(config_path) => Config::load_from_path(config_path),
        None => Config::load_or_create(),
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_telemetry();
            eprintln!("Hint: {}", e.user_hint());
            return Err(e.into());
        }
    };

    // `--log` wins over the config file; RUST_LOG wins over both
    init_telemetry_with_level(cli.log.as_deref().unwrap_or(&config.core.log_level));

    tracing::info!("Recall Engine v{}", env!("CARGO_PKG_VERSION"));

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let result = match &cli.command {
        Command::Chat => {
            tracing::info!("Starting chat session...");
            handle_chat(&config, format).await
        }

        Command::Probe => {
            tracing::info!("Testing summarizer...");
            handle_probe(&config, format).await
        }

        Command::Config { action } => {
            tracing::debug!("Config management: {:?}", action);
            handle_config(action, &config, cli.config.as_deref(), format)
        }
    };

    if let Err(e) = &result {
        if let Some(engine_error) = e.downcast_ref::<EngineError>() {
            eprintln!("Hint: {}", engine_error.user_hint());
        }
    }

    result
}
