//! Document store abstraction.
//!
//! The answering pipeline only reads from the store. Predicates are
//! evaluated in Rust by [`Predicate::matches`] so every implementation agrees
//! on what "contains" means.

pub mod ingest;
pub mod memory;
pub mod sqlite;

pub use ingest::{ingest_paths, read_documents, IngestStats};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::types::Record;
use sanad_core::AppResult;

/// Record filter understood by every store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every record, in store order
    All,
    /// Some listed field contains some needle, case-insensitively
    AnyFieldContains {
        fields: Vec<String>,
        needles: Vec<String>,
    },
}

impl Predicate {
    /// Build an `AnyFieldContains` predicate with lower-cased, non-empty needles.
    pub fn any_field_contains(fields: &[String], needles: &[String]) -> Self {
        Predicate::AnyFieldContains {
            fields: fields.to_vec(),
            needles: needles
                .iter()
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Whether a record satisfies the predicate.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::AnyFieldContains { fields, needles } => fields.iter().any(|field| {
                record
                    .fields
                    .get(field)
                    .and_then(serde_json::Value::as_str)
                    .map(|value| {
                        let value = value.to_lowercase();
                        needles.iter().any(|needle| value.contains(needle.as_str()))
                    })
                    .unwrap_or(false)
            }),
        }
    }
}

/// Read access to a store of named record collections.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name for logs (e.g., "memory", "sqlite").
    fn name(&self) -> &str;

    /// Collection names in enumeration order.
    async fn list_collections(&self) -> AppResult<Vec<String>>;

    /// The first record of a collection, if any.
    async fn find_one(&self, collection: &str) -> AppResult<Option<Record>>;

    /// Up to `limit` records matching `predicate`, in store order.
    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
        limit: usize,
    ) -> AppResult<Vec<Record>>;

    /// Whether a native text index exists for the collection.
    async fn has_text_index(&self, collection: &str) -> AppResult<bool>;

    /// Native text search; only meaningful when `has_text_index` is true.
    async fn text_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        Record::from_document(
            json!({"_id": "1", "title": "Tuition Fees", "notes": "Paid per semester", "year": 2024}),
            "_id",
        )
        .unwrap()
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(Predicate::All.matches(&record()));
    }

    #[test]
    fn test_any_field_contains_is_case_insensitive() {
        let fields = vec!["title".to_string(), "notes".to_string()];
        let predicate = Predicate::any_field_contains(&fields, &["SEMESTER".to_string()]);
        assert!(predicate.matches(&record()));
    }

    #[test]
    fn test_any_field_contains_only_listed_fields() {
        let fields = vec!["title".to_string()];
        let predicate = Predicate::any_field_contains(&fields, &["semester".to_string()]);
        assert!(!predicate.matches(&record()));
    }

    #[test]
    fn test_non_string_fields_never_match() {
        let fields = vec!["year".to_string()];
        let predicate = Predicate::any_field_contains(&fields, &["2024".to_string()]);
        assert!(!predicate.matches(&record()));
    }

    #[test]
    fn test_blank_needles_dropped() {
        let fields = vec!["title".to_string()];
        let predicate = Predicate::any_field_contains(&fields, &["  ".to_string()]);
        assert!(!predicate.matches(&record()));
    }
}
