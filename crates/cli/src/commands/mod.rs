//! Command handlers for the Sanad CLI.
//!
//! Each command lives in its own submodule. Shared setup of the store and
//! the answering pipeline is kept here.

pub mod ask;
pub mod index;
pub mod ingest;
pub mod inspect;
pub mod scan;
pub mod train;

pub use ask::AskCommand;
pub use index::IndexCommand;
pub use ingest::IngestCommand;
pub use inspect::InspectCommand;
pub use scan::ScanCommand;
pub use train::TrainCommand;

use std::sync::Arc;

use sanad_core::{config::AppConfig, AppError, AppResult};
use sanad_llm::LlmClient;
use sanad_retrieval::{AnswerOrchestrator, SqliteStore};

/// Open the workspace document store.
pub(crate) fn open_store(config: &AppConfig) -> AppResult<Arc<SqliteStore>> {
    Ok(Arc::new(SqliteStore::open(&config.store_path())?))
}

/// Assemble the answering pipeline for the workspace.
///
/// The collection catalog is scanned immediately. A missing or unreadable
/// lookup table is logged and every query falls back to search.
pub(crate) async fn build_orchestrator(
    config: &AppConfig,
    client: Arc<dyn LlmClient>,
) -> AppResult<AnswerOrchestrator> {
    let retrieval = sanad_retrieval::load_config(&config.workspace)?;
    let prompt = sanad_prompt::load_prompt_or_default(&config.workspace, &retrieval.prompt_id)?;
    let store = open_store(config)?;

    let orchestrator = AnswerOrchestrator::new(store, client, &config.model, retrieval, prompt);
    let collections = orchestrator.rescan().await?;
    tracing::debug!("Catalog holds {} collections", collections);

    let lookup_path = config.lookup_path();
    if lookup_path.exists() {
        if let Err(e) = orchestrator.lookup().reload(&lookup_path) {
            tracing::warn!("{}; answering from search only", e);
        }
    } else {
        tracing::debug!("No lookup table at {:?}", lookup_path);
    }

    Ok(orchestrator)
}

/// Identifier field from the flag or the retrieval config.
pub(crate) fn resolve_id_field(config: &AppConfig, flag: Option<&str>) -> AppResult<String> {
    match flag {
        Some(field) => Ok(field.to_string()),
        None => Ok(sanad_retrieval::load_config(&config.workspace)?.id_field),
    }
}

/// Pretty JSON for command output.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))
}
