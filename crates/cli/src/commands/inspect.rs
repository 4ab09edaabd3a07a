//! Inspect command handler.
//!
//! Operator diagnostics: shows which collections the search step ranked,
//! their raw scores and the exact context the model would receive. The
//! remote model is never contacted.

use clap::Args;
use sanad_core::{config::AppConfig, AppResult};
use sanad_llm::MockLlmClient;
use std::sync::Arc;

use super::{build_orchestrator, to_json};

/// Show ranked search results and the grounding context for a query
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// The question to search for
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing inspect command");

        let orchestrator = build_orchestrator(config, Arc::new(MockLlmClient::new(""))).await?;
        let inspection = orchestrator.inspect_search(&self.query).await?;

        if self.json {
            println!("{}", to_json(&inspection)?);
            return Ok(());
        }

        println!("Query: {}", inspection.query);
        println!("Records: {}", inspection.relevant_data_count);
        for (rank, result) in inspection.ranked_results.iter().enumerate() {
            println!(
                "  {}. {} (score {:.1}, {} records)",
                rank + 1,
                result.collection,
                result.relevance_score,
                result.records.len()
            );
        }
        println!();
        println!("{}", inspection.formatted_context);

        Ok(())
    }
}
