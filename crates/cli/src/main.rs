//! Sanad CLI
//!
//! Main entry point for the sanad command-line tool.
//! Answers questions from an organization's own records.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, IndexCommand, IngestCommand, InspectCommand, ScanCommand, TrainCommand,
};
use sanad_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use std::path::PathBuf;

/// Sanad - grounded answers over your organization's records
#[derive(Parser, Debug)]
#[command(name = "sanad")]
#[command(about = "Grounded answers over your organization's records", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SANAD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SANAD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log output format (text, json)
    #[arg(long, global = true, env = "SANAD_LOG_FORMAT", default_value = "text")]
    log_format: String,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Remote model provider (openrouter, ollama, mock)
    #[arg(short, long, global = true, env = "SANAD_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SANAD_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question from the stored records
    Ask(AskCommand),

    /// Show ranked search results and the grounding context for a query
    Inspect(InspectCommand),

    /// List collections and their searchable fields
    Scan(ScanCommand),

    /// Load JSON or JSON Lines documents into a collection
    Ingest(IngestCommand),

    /// Create a full-text index for a collection
    Index(IndexCommand),

    /// Build the question lookup table from the stored records
    Train(TrainCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and config file
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(
        config.log_level.as_deref(),
        config.no_color,
        LogFormat::from_name(&cli.log_format),
    )?;

    tracing::info!("Sanad CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.ensure_sanad_dir()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Inspect(_) => "inspect",
        Commands::Scan(_) => "scan",
        Commands::Ingest(_) => "ingest",
        Commands::Index(_) => "index",
        Commands::Train(_) => "train",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Inspect(cmd) => cmd.execute(&config).await,
        Commands::Scan(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Train(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
