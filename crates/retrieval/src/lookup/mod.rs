//! Precomputed question/answer lookup.
//!
//! The table is produced by training and only read while answering. A
//! process holds it in a [`SharedLookupTable`] so a retrain can swap in a new
//! table without blocking readers.

pub mod resolver;
pub mod similarity;

pub use resolver::LookupResolver;
pub use similarity::canonicalize;

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sanad_core::{AppError, AppResult};

/// One canonical question with its precomputed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub canonical_question: String,
    pub answer: String,
    #[serde(default)]
    pub source_tags: BTreeSet<String>,
}

/// On-disk layouts: the current entry list or a flat question-to-answer map.
#[derive(Deserialize)]
#[serde(untagged)]
enum LookupFile {
    Entries { entries: Vec<LookupEntry> },
    Flat(Map<String, Value>),
}

#[derive(Serialize)]
struct LookupFileRef<'a> {
    entries: &'a [LookupEntry],
}

/// Ordered entries with an exact-match index on the canonical question.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    entries: Vec<LookupEntry>,
    index: HashMap<String, usize>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries; the first entry for a canonical question wins.
    pub fn from_entries(entries: impl IntoIterator<Item = LookupEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.push(entry);
        }
        table
    }

    /// Add a question after canonicalizing it. Returns false when the
    /// question already has an answer.
    pub fn insert(
        &mut self,
        question: &str,
        answer: impl Into<String>,
        source_tags: impl IntoIterator<Item = String>,
    ) -> bool {
        self.push(LookupEntry {
            canonical_question: canonicalize(question),
            answer: answer.into(),
            source_tags: source_tags.into_iter().collect(),
        })
    }

    fn push(&mut self, mut entry: LookupEntry) -> bool {
        entry.canonical_question = canonicalize(&entry.canonical_question);
        if entry.canonical_question.is_empty() || self.index.contains_key(&entry.canonical_question)
        {
            return false;
        }
        self.index
            .insert(entry.canonical_question.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Entry whose canonical question equals `canonical` exactly.
    pub fn get_exact(&self, canonical: &str) -> Option<&LookupEntry> {
        self.index.get(canonical).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[LookupEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the table as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&LookupFileRef {
            entries: &self.entries,
        })?;
        std::fs::write(path, json).map_err(|e| {
            AppError::Other(format!("Failed to write lookup table {:?}: {}", path, e))
        })?;

        tracing::info!("Saved {} lookup entries to {:?}", self.len(), path);
        Ok(())
    }

    /// Read a table written by [`LookupTable::save`] or a flat JSON map of
    /// question to answer.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::LookupTableUnavailable(format!("Failed to read {:?}: {}", path, e))
        })?;

        let file: LookupFile = serde_json::from_str(&contents).map_err(|e| {
            AppError::LookupTableUnavailable(format!("Failed to parse {:?}: {}", path, e))
        })?;

        let table = match file {
            LookupFile::Entries { entries } => Self::from_entries(entries),
            LookupFile::Flat(map) => Self::from_entries(map.into_iter().filter_map(
                |(question, answer)| {
                    answer.as_str().map(|answer| LookupEntry {
                        canonical_question: question,
                        answer: answer.to_string(),
                        source_tags: BTreeSet::new(),
                    })
                },
            )),
        };

        tracing::info!("Loaded {} lookup entries from {:?}", table.len(), path);
        Ok(table)
    }
}

/// Process-wide handle to the current lookup table, if any.
#[derive(Debug, Default)]
pub struct SharedLookupTable {
    slot: RwLock<Option<Arc<LookupTable>>>,
}

impl SharedLookupTable {
    /// A handle with no table; every query falls back to search.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_table(table: LookupTable) -> Self {
        Self {
            slot: RwLock::new(Some(Arc::new(table))),
        }
    }

    /// The table in effect right now.
    pub fn current(&self) -> Option<Arc<LookupTable>> {
        match self.slot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Publish a new table.
    pub fn swap(&self, table: LookupTable) {
        let table = Arc::new(table);
        match self.slot.write() {
            Ok(mut guard) => *guard = Some(table),
            Err(poisoned) => *poisoned.into_inner() = Some(table),
        }
    }

    /// Mark the table unavailable.
    pub fn clear(&self) {
        match self.slot.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    /// Load a table from disk and publish it. On failure the slot is left
    /// empty and the error returned.
    pub fn reload(&self, path: &Path) -> AppResult<usize> {
        match LookupTable::load(path) {
            Ok(table) => {
                let count = table.len();
                self.swap(table);
                Ok(count)
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }
}
