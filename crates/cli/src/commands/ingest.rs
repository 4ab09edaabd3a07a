//! Ingest command handler.

use clap::Args;
use sanad_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

use super::{open_store, resolve_id_field, to_json};

/// Load JSON or JSON Lines documents into a collection
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Target collection
    pub collection: String,

    /// Files or directories (.json, .jsonl)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Document field holding the record identifier
    #[arg(long)]
    pub id_field: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        let id_field = resolve_id_field(config, self.id_field.as_deref())?;
        let store = open_store(config)?;
        let stats =
            sanad_retrieval::ingest_paths(&store, &self.collection, &self.paths, &id_field)
                .await?;

        if self.json {
            println!("{}", to_json(&stats)?);
        } else {
            println!(
                "Ingested {} documents from {} files into '{}'",
                stats.documents, stats.files, self.collection
            );
            if stats.skipped_files > 0 {
                println!("Skipped {} unreadable files (see log)", stats.skipped_files);
            }
        }

        Ok(())
    }
}
