//! Shared fixtures: a call-counting store wrapper and orchestrator builders.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sanad_core::{AppError, AppResult};
use sanad_llm::MockLlmClient;
use sanad_prompt::default_answer_prompt;
use serde_json::json;

use crate::config::RetrievalConfig;
use crate::orchestrator::AnswerOrchestrator;
use crate::store::{DocumentStore, MemoryStore, Predicate};
use crate::types::Record;

/// Delegating store that counts search calls and can be made to fail or stall.
pub struct CountingStore {
    inner: Arc<dyn DocumentStore>,
    search_calls: AtomicUsize,
    fail_searches: bool,
    delay: Option<Duration>,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            search_calls: AtomicUsize::new(0),
            fail_searches: false,
            delay: None,
        }
    }

    /// Every search call fails with `StoreUnavailable`.
    pub fn failing(mut self) -> Self {
        self.fail_searches = true;
        self
    }

    /// Every search call sleeps first.
    pub fn stalling(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls made by the search engine (find, index checks, text search).
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    async fn before_search(&self) -> AppResult<()> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_searches {
            return Err(AppError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for CountingStore {
    fn name(&self) -> &str {
        "counting"
    }

    async fn list_collections(&self) -> AppResult<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn find_one(&self, collection: &str) -> AppResult<Option<Record>> {
        self.inner.find_one(collection).await
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        self.before_search().await?;
        self.inner.find(collection, predicate, limit).await
    }

    async fn has_text_index(&self, collection: &str) -> AppResult<bool> {
        self.before_search().await?;
        self.inner.has_text_index(collection).await
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        self.before_search().await?;
        self.inner.text_search(collection, query, limit).await
    }
}

/// A small bilingual university data set.
pub fn university_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_documents(
            "courses",
            vec![
                json!({"_id": "crs-101", "title": "Data Structures", "department": "Computer Science"}),
                json!({"_id": "crs-102", "title": "Linear Algebra", "department": "Mathematics"}),
            ],
            "_id",
        )
        .unwrap();
    store
        .insert_documents(
            "admissions",
            vec![json!({
                "_id": "adm-001",
                "title": "متطلبات القبول",
                "requirements": "يجب اجتياز اختبار القدرات",
                "deadline": "2024-08-01"
            })],
            "_id",
        )
        .unwrap();
    store
        .insert_documents(
            "fees",
            vec![json!({"_id": "fee-1", "title": "Tuition", "amount": 1200, "currency": "SAR"})],
            "_id",
        )
        .unwrap();
    store
}

/// Orchestrator over `store` with a scanned catalog.
pub async fn orchestrator(
    store: Arc<dyn DocumentStore>,
    client: Arc<MockLlmClient>,
    config: RetrievalConfig,
) -> AnswerOrchestrator {
    let orchestrator = AnswerOrchestrator::new(
        store,
        client,
        "mock-model",
        config,
        default_answer_prompt().unwrap(),
    );
    orchestrator.rescan().await.unwrap();
    orchestrator
}
