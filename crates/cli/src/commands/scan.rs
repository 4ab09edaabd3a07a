//! Scan command handler.

use clap::Args;
use sanad_core::{config::AppConfig, AppResult};
use serde::Serialize;
use std::collections::HashMap;

use super::{open_store, resolve_id_field, to_json};

/// List collections and their searchable fields
#[derive(Args, Debug)]
pub struct ScanCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSummary {
    name: String,
    record_count: usize,
    fields: Vec<String>,
}

impl ScanCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing scan command");

        let id_field = resolve_id_field(config, None)?;
        let store = open_store(config)?;
        let collections = sanad_retrieval::scan(store.as_ref(), &id_field).await?;
        let counts: HashMap<String, usize> = store.collection_counts().await?.into_iter().collect();

        let summaries: Vec<CollectionSummary> = collections
            .into_iter()
            .map(|c| CollectionSummary {
                record_count: counts.get(&c.name).copied().unwrap_or(0),
                name: c.name,
                fields: c.fields,
            })
            .collect();

        if self.json {
            println!("{}", to_json(&summaries)?);
            return Ok(());
        }

        if summaries.is_empty() {
            println!("No collections. Use 'sanad ingest' to load documents.");
            return Ok(());
        }

        for summary in &summaries {
            let fields = if summary.fields.is_empty() {
                "(no text fields)".to_string()
            } else {
                summary.fields.join(", ")
            };
            println!("{} ({} records): {}", summary.name, summary.record_count, fields);
        }

        Ok(())
    }
}
