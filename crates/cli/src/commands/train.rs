//! Train command handler.
//!
//! Rebuilds the question lookup table from every stored record.

use clap::Args;
use sanad_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

use super::{open_store, resolve_id_field};

/// Build the question lookup table from the stored records
#[derive(Args, Debug)]
pub struct TrainCommand {
    /// Where to write the table (default: .sanad/lookup.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl TrainCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing train command");

        let id_field = resolve_id_field(config, None)?;
        let store = open_store(config)?;
        let collections = sanad_retrieval::scan(store.as_ref(), &id_field).await?;
        let table = sanad_retrieval::train(store.as_ref(), &collections, &id_field).await?;

        let output = self.output.clone().unwrap_or_else(|| config.lookup_path());
        table.save(&output)?;

        println!(
            "Wrote {} questions from {} collections to {}",
            table.len(),
            collections.len(),
            output.display()
        );
        Ok(())
    }
}
