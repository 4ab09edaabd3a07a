//! Multi-strategy search over every known collection.
//!
//! Per collection, strategies run in a fixed order and the first one that
//! returns records wins:
//! 1. native text search (only when the collection has a text index)
//! 2. keyword substring match over the inferred fields
//! 3. whole-query substring match over the inferred fields
//! 4. the first few records of the collection
//!
//! Collections are searched concurrently and reassembled in catalog order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::config::RetrievalConfig;
use crate::keywords::KeywordExtractor;
use crate::store::{DocumentStore, Predicate};
use crate::types::{Collection, Record};
use sanad_core::{AppError, AppResult};

/// Which strategy produced a collection's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TextIndex,
    Keywords,
    Phrase,
    Sample,
}

/// Raw candidates of one collection.
#[derive(Debug, Clone)]
pub struct CollectionHits {
    pub collection: Collection,
    pub records: Vec<Record>,
    pub strategy: Strategy,
}

/// Runs the strategy cascade against a document store.
pub struct SearchEngine {
    store: Arc<dyn DocumentStore>,
    extractor: KeywordExtractor,
    strategy_limit: usize,
    sample_limit: usize,
    store_timeout: Duration,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn DocumentStore>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            extractor: KeywordExtractor::new(config.max_keywords),
            strategy_limit: config.strategy_limit,
            sample_limit: config.sample_limit,
            store_timeout: Duration::from_secs(config.store_timeout_secs),
        }
    }

    /// Search every collection; collections without any record are omitted.
    pub async fn search(
        &self,
        query: &str,
        collections: &[Collection],
    ) -> AppResult<Vec<CollectionHits>> {
        let keywords = self.extractor.extract(query);
        tracing::debug!("Search keywords for '{}': {:?}", query, keywords);

        let outcomes = join_all(
            collections
                .iter()
                .map(|collection| self.search_collection(query, &keywords, collection)),
        )
        .await;

        let mut hits = Vec::new();
        for outcome in outcomes {
            if let Some(found) = outcome? {
                hits.push(found);
            }
        }

        tracing::debug!(
            "Search produced candidates in {}/{} collections",
            hits.len(),
            collections.len()
        );
        Ok(hits)
    }

    async fn search_collection(
        &self,
        query: &str,
        keywords: &[String],
        collection: &Collection,
    ) -> AppResult<Option<CollectionHits>> {
        let name = collection.name.as_str();
        let found = |records: Vec<Record>, strategy: Strategy| {
            tracing::debug!(
                "Collection '{}': {} records via {:?}",
                name,
                records.len(),
                strategy
            );
            Some(CollectionHits {
                collection: collection.clone(),
                records,
                strategy,
            })
        };

        if collection.is_searchable() {
            let records = self.text_index_search(name, query).await;
            if !records.is_empty() {
                return Ok(found(records, Strategy::TextIndex));
            }

            if !keywords.is_empty() {
                let predicate = Predicate::any_field_contains(&collection.fields, keywords);
                let records = self
                    .bounded(self.store.find(name, &predicate, self.strategy_limit))
                    .await?;
                if !records.is_empty() {
                    return Ok(found(records, Strategy::Keywords));
                }
            }

            let phrase = query.trim();
            if !phrase.is_empty() {
                let predicate =
                    Predicate::any_field_contains(&collection.fields, &[phrase.to_string()]);
                let records = self
                    .bounded(self.store.find(name, &predicate, self.strategy_limit))
                    .await?;
                if !records.is_empty() {
                    return Ok(found(records, Strategy::Phrase));
                }
            }
        }

        let records = self
            .bounded(self.store.find(name, &Predicate::All, self.sample_limit))
            .await?;
        if records.is_empty() {
            tracing::debug!("Collection '{}' is empty", name);
            return Ok(None);
        }

        Ok(found(records, Strategy::Sample))
    }

    /// Native text search; any failure counts as no result.
    async fn text_index_search(&self, collection: &str, query: &str) -> Vec<Record> {
        match self.bounded(self.store.has_text_index(collection)).await {
            Ok(true) => {}
            Ok(false) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Text index check failed for '{}': {}", collection, e);
                return Vec::new();
            }
        }

        match self
            .bounded(self.store.text_search(collection, query, self.strategy_limit))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Text search failed for '{}': {}", collection, e);
                Vec::new()
            }
        }
    }

    /// Apply the store deadline to one call.
    async fn bounded<T>(&self, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::StoreUnavailable(format!(
                "{} store did not answer within {}s",
                self.store.name(),
                self.store_timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn engine(store: Arc<MemoryStore>) -> SearchEngine {
        SearchEngine::new(store, &RetrievalConfig::default())
    }

    fn courses() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_documents(
                "courses",
                vec![
                    json!({"_id": "1", "title": "Data Structures", "summary": "Trees and graphs"}),
                    json!({"_id": "2", "title": "Databases", "summary": "SQL and indexing"}),
                    json!({"_id": "3", "title": "Networks", "summary": "Routing"}),
                    json!({"_id": "4", "title": "Compilers", "summary": "Parsing"}),
                ],
                "_id",
            )
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_keywords_strategy() {
        let store = courses();
        let collections = scan(store.as_ref(), "_id").await.unwrap();

        let hits = engine(store).search("graphs please", &collections).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].strategy, Strategy::Keywords);
        assert_eq!(hits[0].records[0].id, "1");
    }

    #[tokio::test]
    async fn test_phrase_strategy_when_keywords_are_stop_words() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_documents("faq", vec![json!({"q": "Who is who"}), json!({"q": "x"})], "_id")
            .unwrap();
        let collections = scan(store.as_ref(), "_id").await.unwrap();

        let hits = engine(store).search("who is who", &collections).await.unwrap();
        assert_eq!(hits[0].strategy, Strategy::Phrase);
        assert_eq!(hits[0].records.len(), 1);
    }

    #[tokio::test]
    async fn test_text_index_first() {
        let store = courses();
        store.enable_text_index("courses").unwrap();
        let collections = scan(store.as_ref(), "_id").await.unwrap();

        let hits = engine(store).search("routing", &collections).await.unwrap();
        assert_eq!(hits[0].strategy, Strategy::TextIndex);
        assert_eq!(hits[0].records[0].id, "3");
    }

    #[tokio::test]
    async fn test_sample_fallback_is_deterministic() {
        let store = courses();
        let collections = scan(store.as_ref(), "_id").await.unwrap();
        let engine = engine(store);

        let first = engine.search("quantum chemistry", &collections).await.unwrap();
        let second = engine.search("quantum chemistry", &collections).await.unwrap();

        assert_eq!(first[0].strategy, Strategy::Sample);
        assert_eq!(first[0].records.len(), 3);
        let ids = |hits: &[CollectionHits]| -> Vec<String> {
            hits[0].records.iter().map(|r| r.id.clone()).collect()
        };
        assert_eq!(ids(&first), vec!["1", "2", "3"]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_stringless_collection_still_sampled() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_documents("metrics", vec![json!({"count": 1})], "_id")
            .unwrap();
        let collections = scan(store.as_ref(), "_id").await.unwrap();

        let hits = engine(store).search("count", &collections).await.unwrap();
        assert_eq!(hits[0].strategy, Strategy::Sample);
    }

    #[tokio::test]
    async fn test_empty_collection_omitted_and_order_kept() {
        let store = Arc::new(MemoryStore::new());
        store.insert_documents("b", vec![json!({"t": "x"})], "_id").unwrap();
        store.create_collection("empty").unwrap();
        store.insert_documents("a", vec![json!({"t": "y"})], "_id").unwrap();
        let collections = scan(store.as_ref(), "_id").await.unwrap();

        let hits = engine(store).search("anything", &collections).await.unwrap();
        let names: Vec<_> = hits.iter().map(|h| h.collection.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_strategy_limit_caps_records() {
        let store = Arc::new(MemoryStore::new());
        let docs = (0..8).map(|i| json!({"t": format!("fees item {}", i)})).collect();
        store.insert_documents("fees", docs, "_id").unwrap();
        let collections = scan(store.as_ref(), "_id").await.unwrap();

        let hits = engine(store).search("fees", &collections).await.unwrap();
        assert_eq!(hits[0].records.len(), 5);
    }
}
