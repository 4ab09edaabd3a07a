//! Relevance scoring and ranking of per-collection candidates.

use crate::config::RetrievalConfig;
use crate::keywords::query_words;
use crate::search::CollectionHits;
use crate::types::{Record, SearchResult};

/// Additive substring scorer.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    full_match_weight: f64,
    word_match_weight: f64,
    top_k: usize,
}

impl RelevanceScorer {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self {
            full_match_weight: config.full_match_weight,
            word_match_weight: config.word_match_weight,
            top_k: config.top_k,
        }
    }

    /// Score a group of records against a query.
    ///
    /// Every top-level string field earns the full-match weight when it
    /// contains the whole query, plus the word weight for each query word it
    /// contains. Scores are summed without normalization.
    pub fn score(&self, query: &str, records: &[Record]) -> f64 {
        let phrase = query.trim().to_lowercase();
        let words = query_words(query);

        records
            .iter()
            .flat_map(|record| record.string_fields())
            .map(|(_, value)| {
                let value = value.to_lowercase();
                let mut score = 0.0;
                if !phrase.is_empty() && value.contains(&phrase) {
                    score += self.full_match_weight;
                }
                for word in &words {
                    if value.contains(word.as_str()) {
                        score += self.word_match_weight;
                    }
                }
                score
            })
            .sum()
    }

    /// Score every collection and keep the best `top_k`.
    ///
    /// The sort is stable so equal scores keep catalog order. Collections
    /// scoring zero remain eligible.
    pub fn rank(&self, query: &str, candidates: Vec<CollectionHits>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .map(|hits| {
                let relevance_score = self.score(query, &hits.records);
                tracing::debug!(
                    "Collection '{}' scored {:.1}",
                    hits.collection.name,
                    relevance_score
                );
                SearchResult {
                    collection: hits.collection.name,
                    records: hits.records,
                    relevance_score,
                }
            })
            .collect();

        results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        results.truncate(self.top_k);
        results
    }
}
