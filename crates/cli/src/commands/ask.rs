//! Ask command handler.
//!
//! Answers one question from the lookup table or the stored records,
//! optionally continuing an earlier conversation.

use clap::Args;
use sanad_core::{config::AppConfig, AppError, AppResult};
use sanad_llm::create_client_from_config;
use sanad_retrieval::Turn;
use std::path::{Path, PathBuf};

use super::{build_orchestrator, to_json};

/// Answer a question from the stored records
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Earlier conversation turns as a JSON array of {role, content}
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        config.validate()?;

        let history = match &self.history {
            Some(path) => read_history(path)?,
            None => Vec::new(),
        };

        let client = create_client_from_config(config)?;
        let orchestrator = build_orchestrator(config, client).await?;
        let answer = orchestrator.answer(&self.query, &history).await;

        if self.json {
            println!("{}", to_json(&answer)?);
        } else {
            println!("{}", answer.text);

            match answer.confidence {
                Some(confidence) => {
                    tracing::debug!("Answered from lookup table (confidence {:.2})", confidence)
                }
                None => tracing::debug!("Answered from {} collections", answer.source_count),
            }
        }

        Ok(())
    }
}

/// Read conversation turns from a JSON file.
fn read_history(path: &Path) -> AppResult<Vec<Turn>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read history file {:?}: {}", path, e))
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        AppError::Serialization(format!("Invalid history file {:?}: {}", path, e))
    })
}
