//! Grounded answering over an organization's record collections.
//!
//! The pipeline for one query:
//! 1. [`lookup`]: answer directly from the trained question table when confident
//! 2. [`search`]: per-collection strategy cascade over the [`store`]
//! 3. [`scoring`]: rank collections by substring relevance
//! 4. [`format`]: render the grounding context
//! 5. [`orchestrator`]: delegate to the remote model, or apologize on failure
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use sanad_llm::MockLlmClient;
//! use sanad_retrieval::{AnswerOrchestrator, MemoryStore, RetrievalConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let client = Arc::new(MockLlmClient::new("Tuition is 1200 per term."));
//! let orchestrator = AnswerOrchestrator::new(
//!     store,
//!     client,
//!     "mock",
//!     RetrievalConfig::default(),
//!     sanad_prompt::default_answer_prompt()?,
//! );
//! orchestrator.rescan().await?;
//!
//! let answer = orchestrator.answer("What are the tuition fees?", &[]).await;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod format;
pub mod keywords;
pub mod lookup;
pub mod orchestrator;
pub mod scanner;
pub mod scoring;
pub mod search;
pub mod store;
pub mod training;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{load_config, save_config, RetrievalConfig};
pub use format::{format_context, NO_RELEVANT_DATA};
pub use keywords::KeywordExtractor;
pub use lookup::{LookupEntry, LookupResolver, LookupTable, SharedLookupTable};
pub use orchestrator::{AnswerOrchestrator, APOLOGY};
pub use scanner::{scan, CollectionCatalog};
pub use scoring::RelevanceScorer;
pub use search::{CollectionHits, SearchEngine, Strategy};
pub use store::{
    ingest_paths, DocumentStore, IngestStats, MemoryStore, Predicate, SqliteStore,
};
pub use training::train;
pub use types::{
    Answer, Collection, RankedContext, Record, ResolutionResult, SearchInspection, SearchResult,
    Turn,
};
