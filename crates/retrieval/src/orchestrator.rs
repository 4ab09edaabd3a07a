//! Answer orchestration.
//!
//! Per query: try the lookup table, otherwise search every collection,
//! rank, format the grounding context and delegate to the remote model.
//! Failures after the lookup step are logged and turned into a fixed
//! bilingual apology; raw error text never reaches the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sanad_core::{AppError, AppResult};
use sanad_llm::{ChatMessage, LlmClient, LlmRequest, Role};
use sanad_prompt::{build_prompt, PromptDefinition};

use crate::config::RetrievalConfig;
use crate::format::format_context;
use crate::lookup::{LookupResolver, SharedLookupTable};
use crate::scanner::CollectionCatalog;
use crate::scoring::RelevanceScorer;
use crate::search::SearchEngine;
use crate::store::DocumentStore;
use crate::types::{Answer, Collection, RankedContext, ResolutionResult, SearchInspection, Turn};

/// Returned whenever search or delegation fails.
pub const APOLOGY: &str = "Sorry, I could not answer your question right now. Please try again later.\n\
عذراً، لم أتمكن من الإجابة على سؤالك حالياً. يرجى المحاولة مرة أخرى لاحقاً.";

/// Grounded question answering over a document store.
pub struct AnswerOrchestrator {
    store: Arc<dyn DocumentStore>,
    client: Arc<dyn LlmClient>,
    model: String,
    config: RetrievalConfig,
    prompt: PromptDefinition,
    engine: SearchEngine,
    scorer: RelevanceScorer,
    catalog: CollectionCatalog,
    lookup: Arc<SharedLookupTable>,
    resolver: LookupResolver,
}

impl AnswerOrchestrator {
    /// Orchestrator with an empty catalog and no lookup table.
    ///
    /// Call [`AnswerOrchestrator::rescan`] before answering so the catalog
    /// reflects the store.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        config: RetrievalConfig,
        prompt: PromptDefinition,
    ) -> Self {
        let lookup = Arc::new(SharedLookupTable::empty());
        Self {
            engine: SearchEngine::new(Arc::clone(&store), &config),
            scorer: RelevanceScorer::new(&config),
            resolver: LookupResolver::new(Arc::clone(&lookup), &config),
            catalog: CollectionCatalog::default(),
            store,
            client,
            model: model.into(),
            config,
            prompt,
            lookup,
        }
    }

    /// Share an existing lookup table handle.
    pub fn with_lookup(mut self, lookup: Arc<SharedLookupTable>) -> Self {
        self.resolver = LookupResolver::new(Arc::clone(&lookup), &self.config);
        self.lookup = lookup;
        self
    }

    /// Start from a known collection list instead of an empty catalog.
    pub fn with_collections(self, collections: Vec<Collection>) -> Self {
        Self {
            catalog: CollectionCatalog::new(collections),
            ..self
        }
    }

    /// Handle used to hot-swap the lookup table.
    pub fn lookup(&self) -> Arc<SharedLookupTable> {
        Arc::clone(&self.lookup)
    }

    /// Collections currently searched.
    pub fn collections(&self) -> Arc<Vec<Collection>> {
        self.catalog.snapshot()
    }

    /// Re-enumerate the store's collections. Returns how many were found.
    pub async fn rescan(&self) -> AppResult<usize> {
        self.catalog
            .rescan(self.store.as_ref(), &self.config.id_field)
            .await
    }

    /// Answer a query. Never fails: errors become [`APOLOGY`].
    pub async fn answer(&self, query: &str, history: &[Turn]) -> Answer {
        tracing::info!("Answering query: {}", query);

        if let ResolutionResult::LookupHit { answer, confidence } = self.resolver.resolve(query) {
            tracing::info!("Answered from lookup table (confidence {:.2})", confidence);
            return Answer {
                text: answer,
                used_search: false,
                source_count: 0,
                confidence: Some(confidence),
            };
        }

        match self.answer_with_search(query, history).await {
            Ok(answer) => {
                tracing::info!("Answered from {} ranked collections", answer.source_count);
                answer
            }
            Err(e) => {
                if e.is_remote() {
                    tracing::error!("Remote model failed for query '{}': {}", query, e);
                } else {
                    tracing::error!("Search failed for query '{}': {}", query, e);
                }
                Answer {
                    text: APOLOGY.to_string(),
                    used_search: true,
                    source_count: 0,
                    confidence: None,
                }
            }
        }
    }

    /// Search, rank and format without calling the remote model.
    pub async fn rank_context(&self, query: &str) -> AppResult<RankedContext> {
        let collections = self.catalog.snapshot();
        let hits = self.engine.search(query, &collections).await?;
        let results = self.scorer.rank(query, hits);
        let formatted = format_context(&results, query);

        Ok(RankedContext { results, formatted })
    }

    /// Operator view of the search step, with raw scores. Errors are returned.
    pub async fn inspect_search(&self, query: &str) -> AppResult<SearchInspection> {
        let ranked = self.rank_context(query).await?;
        let relevant_data_count = ranked.results.iter().map(|r| r.records.len()).sum();

        Ok(SearchInspection {
            query: query.to_string(),
            relevant_data_count,
            ranked_results: ranked.results,
            formatted_context: ranked.formatted,
        })
    }

    async fn answer_with_search(&self, query: &str, history: &[Turn]) -> AppResult<Answer> {
        let ranked = self.rank_context(query).await?;
        tracing::debug!(
            "Grounding context: {} collections, {} bytes",
            ranked.results.len(),
            ranked.formatted.len()
        );

        let messages = self.build_messages(query, &ranked.formatted, history)?;
        let request = LlmRequest::new(&self.model, messages)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let seconds = self.config.remote_timeout_secs;
        let response = tokio::time::timeout(
            Duration::from_secs(seconds),
            self.client.complete(&request),
        )
        .await
        .map_err(|_| AppError::RemoteTimeout { seconds })??;

        Ok(Answer {
            text: response.content,
            used_search: true,
            source_count: ranked.results.len(),
            confidence: None,
        })
    }

    /// System prompt, the most recent history, then the query.
    fn build_messages(
        &self,
        query: &str,
        context: &str,
        history: &[Turn],
    ) -> AppResult<Vec<ChatMessage>> {
        let mut variables = HashMap::new();
        variables.insert("context".to_string(), context.to_string());
        variables.insert("query".to_string(), query.to_string());
        let built = build_prompt(&self.prompt, variables)?;

        let turns: Vec<&Turn> = history.iter().filter(|t| t.role != Role::System).collect();
        let recent = &turns[turns.len().saturating_sub(self.config.history_turns)..];

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(built.system));
        messages.extend(recent.iter().map(|turn| (*turn).clone()));
        messages.push(ChatMessage::user(query));
        Ok(messages)
    }
}
