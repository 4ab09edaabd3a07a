use std::sync::Arc;

use super::similarity::{canonicalize, question_similarity};
use super::SharedLookupTable;
use crate::config::RetrievalConfig;
use crate::types::ResolutionResult;

/// Answers a query from the lookup table when it is confident enough.
pub struct LookupResolver {
    table: Arc<SharedLookupTable>,
    threshold: f64,
    token_threshold: f64,
}

impl LookupResolver {
    pub fn new(table: Arc<SharedLookupTable>, config: &RetrievalConfig) -> Self {
        Self {
            table,
            threshold: config.lookup_threshold,
            token_threshold: config.fuzzy_token_threshold,
        }
    }

    /// Exact match first, then the most similar question.
    ///
    /// Returns [`ResolutionResult::miss`] when no table is loaded or the best
    /// confidence does not exceed the threshold.
    pub fn resolve(&self, query: &str) -> ResolutionResult {
        let Some(table) = self.table.current() else {
            tracing::debug!("No lookup table loaded");
            return ResolutionResult::miss();
        };

        let canonical = canonicalize(query);
        if canonical.is_empty() {
            return ResolutionResult::miss();
        }

        if let Some(entry) = table.get_exact(&canonical) {
            tracing::info!("Lookup exact match for '{}'", canonical);
            return ResolutionResult::LookupHit {
                answer: entry.answer.clone(),
                confidence: 1.0,
            };
        }

        let mut best: Option<(f64, usize)> = None;
        for (i, entry) in table.entries().iter().enumerate() {
            let score = question_similarity(
                &canonical,
                &entry.canonical_question,
                self.token_threshold,
            );
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, i));
            }
        }

        match best {
            Some((confidence, i)) if confidence > self.threshold => {
                let entry = &table.entries()[i];
                tracing::info!(
                    "Lookup matched '{}' with confidence {:.2}",
                    entry.canonical_question,
                    confidence
                );
                ResolutionResult::LookupHit {
                    answer: entry.answer.clone(),
                    confidence,
                }
            }
            other => {
                tracing::debug!(
                    "Lookup miss for '{}' (best {:.2})",
                    canonical,
                    other.map_or(0.0, |(score, _)| score)
                );
                ResolutionResult::miss()
            }
        }
    }
}
