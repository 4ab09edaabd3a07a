//! Domain types for the answering pipeline.

use sanad_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A conversation turn. System-role turns in caller history are ignored.
pub type Turn = sanad_llm::ChatMessage;

/// A named collection and the string fields inferred from one sample record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub fields: Vec<String>,
}

impl Collection {
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Whether any field can be searched by text strategies.
    pub fn is_searchable(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// A stored document with its identifier held apart from its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Split a JSON document into identifier and fields.
    ///
    /// The identifier is taken from `id_field` (string or number) and removed
    /// from the fields. Documents without one get a fresh UUID.
    pub fn from_document(document: Value, id_field: &str) -> AppResult<Self> {
        let mut fields = match document {
            Value::Object(map) => map,
            other => {
                return Err(AppError::Serialization(format!(
                    "Expected a JSON object document, got: {}",
                    other
                )))
            }
        };

        let id = match fields.shift_remove(id_field) {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Self { id, fields })
    }

    /// Top-level string fields in document order.
    pub fn string_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(name, value)| value.as_str().map(|text| (name.as_str(), text)))
    }

    /// Value of the first present string field among `names`.
    pub fn first_string(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.fields.get(*name).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
    }
}

/// Candidate records of one collection with their relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub collection: String,
    pub records: Vec<Record>,
    pub relevance_score: f64,
}

/// Top-K results plus the grounding text built from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedContext {
    pub results: Vec<SearchResult>,
    pub formatted: String,
}

impl RankedContext {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Outcome of the lookup step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionResult {
    LookupHit {
        answer: String,
        confidence: f64,
    },
    SearchFallback {
        formatted_context: String,
        has_relevant_data: bool,
        source_count: usize,
    },
}

impl ResolutionResult {
    /// The fallback signalling that the search pipeline must run.
    pub fn miss() -> Self {
        ResolutionResult::SearchFallback {
            formatted_context: String::new(),
            has_relevant_data: false,
            source_count: 0,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, ResolutionResult::LookupHit { .. })
    }
}

/// Final answer handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub text: String,
    pub used_search: bool,
    pub source_count: usize,
    pub confidence: Option<f64>,
}

/// Search diagnostics for operators; exposes raw scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInspection {
    pub query: String,
    pub relevant_data_count: usize,
    pub ranked_results: Vec<SearchResult>,
    pub formatted_context: String,
}
