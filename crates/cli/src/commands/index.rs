//! Index command handler.

use clap::Args;
use sanad_core::{config::AppConfig, AppResult};

use super::open_store;

/// Create a full-text index for a collection
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Collection to index
    pub collection: String,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command");

        let store = open_store(config)?;
        let indexed = store.create_text_index(&self.collection).await?;

        println!(
            "Indexed {} records of '{}' for full-text search",
            indexed, self.collection
        );
        Ok(())
    }
}
