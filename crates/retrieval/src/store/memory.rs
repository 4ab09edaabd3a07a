//! In-memory document store.
//!
//! Keeps collections in insertion order. Used by tests and by callers that
//! load a fixed data set at startup.

use std::collections::HashSet;
use std::sync::RwLock;

use super::{DocumentStore, Predicate};
use crate::keywords::{text_terms, trim_punctuation};
use crate::types::Record;
use sanad_core::{AppError, AppResult};

#[derive(Debug, Default)]
struct MemoryCollection {
    name: String,
    records: Vec<Record>,
    text_index: bool,
}

/// Ordered in-memory collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Vec<MemoryCollection>>,
}

fn poisoned() -> AppError {
    AppError::StoreUnavailable("In-memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection without records. No-op if it exists.
    pub fn create_collection(&self, name: &str) -> AppResult<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        if !collections.iter().any(|c| c.name == name) {
            collections.push(MemoryCollection {
                name: name.to_string(),
                ..Default::default()
            });
        }
        Ok(())
    }

    /// Append a record, creating the collection on first use.
    pub fn insert(&self, collection: &str, record: Record) -> AppResult<()> {
        self.create_collection(collection)?;
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        if let Some(target) = collections.iter_mut().find(|c| c.name == collection) {
            target.records.push(record);
        }
        Ok(())
    }

    /// Append JSON documents, splitting out `id_field`.
    pub fn insert_documents(
        &self,
        collection: &str,
        documents: Vec<serde_json::Value>,
        id_field: &str,
    ) -> AppResult<usize> {
        let mut count = 0;
        for document in documents {
            self.insert(collection, Record::from_document(document, id_field)?)?;
            count += 1;
        }
        Ok(count)
    }

    /// Mark a collection as having a native text index.
    pub fn enable_text_index(&self, collection: &str) -> AppResult<()> {
        self.create_collection(collection)?;
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        if let Some(target) = collections.iter_mut().find(|c| c.name == collection) {
            target.text_index = true;
        }
        Ok(())
    }

    fn with_collection<T>(
        &self,
        collection: &str,
        f: impl FnOnce(Option<&MemoryCollection>) -> T,
    ) -> AppResult<T> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(f(collections.iter().find(|c| c.name == collection)))
    }
}

/// Whole-word match of any query word against a record's string fields.
fn text_matches(record: &Record, words: &HashSet<String>) -> bool {
    record.string_fields().any(|(_, value)| {
        value
            .to_lowercase()
            .split_whitespace()
            .map(trim_punctuation)
            .any(|token| words.contains(token))
    })
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_collections(&self) -> AppResult<Vec<String>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections.iter().map(|c| c.name.clone()).collect())
    }

    async fn find_one(&self, collection: &str) -> AppResult<Option<Record>> {
        self.with_collection(collection, |c| c.and_then(|c| c.records.first().cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        self.with_collection(collection, |c| {
            c.map(|c| {
                c.records
                    .iter()
                    .filter(|r| predicate.matches(r))
                    .take(limit)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
        })
    }

    async fn has_text_index(&self, collection: &str) -> AppResult<bool> {
        self.with_collection(collection, |c| c.map(|c| c.text_index).unwrap_or(false))
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        let words: HashSet<String> = text_terms(query).into_iter().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        self.with_collection(collection, |c| match c {
            Some(c) if c.text_index => c
                .records
                .iter()
                .filter(|r| text_matches(r, &words))
                .take(limit)
                .cloned()
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }
}
