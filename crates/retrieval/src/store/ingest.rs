//! Record ingestion from JSON and JSON Lines files.

use std::path::{Path, PathBuf};

use serde_json::Value;
use walkdir::WalkDir;

use super::SqliteStore;
use crate::types::Record;
use sanad_core::{AppError, AppResult};

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestStats {
    pub files: usize,
    pub documents: usize,
    pub skipped_files: usize,
}

fn is_ingestible(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("json") | Some("jsonl")
    )
}

/// Read the documents of one `.json` or `.jsonl` file.
///
/// A `.json` file holds an array of objects or a single object. A `.jsonl`
/// file holds one object per non-blank line.
pub fn read_documents(path: &Path) -> AppResult<Vec<Value>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Serialization(format!("Failed to read {:?}: {}", path, e))
    })?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    AppError::Serialization(format!("{:?} line {}: {}", path, n + 1, e))
                })
            })
            .collect(),
        _ => {
            let value: Value = serde_json::from_str(&contents)
                .map_err(|e| AppError::Serialization(format!("{:?}: {}", path, e)))?;
            match value {
                Value::Array(items) => Ok(items),
                other => Ok(vec![other]),
            }
        }
    }
}

/// Expand files and directories into ingestible files, sorted per directory.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_ingestible(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            tracing::warn!("Skipping missing path {:?}", path);
        }
    }

    files
}

/// Load documents from `paths` into `collection` of a SQLite store.
///
/// Unreadable files are skipped with a warning; the identifier is taken
/// from `id_field` or generated.
pub async fn ingest_paths(
    store: &SqliteStore,
    collection: &str,
    paths: &[PathBuf],
    id_field: &str,
) -> AppResult<IngestStats> {
    let mut stats = IngestStats::default();

    for file in collect_files(paths) {
        let documents = match read_documents(&file) {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", file, e);
                stats.skipped_files += 1;
                continue;
            }
        };

        let records = documents
            .into_iter()
            .map(|doc| Record::from_document(doc, id_field))
            .collect::<AppResult<Vec<_>>>();

        let records = match records {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", file, e);
                stats.skipped_files += 1;
                continue;
            }
        };

        stats.documents += store.upsert_records(collection, records).await?;
        stats.files += 1;
        tracing::debug!("Ingested {:?} into '{}'", file, collection);
    }

    tracing::info!(
        "Ingested {} documents from {} files into '{}' ({} skipped)",
        stats.documents,
        stats.files,
        collection,
        stats.skipped_files
    );

    Ok(stats)
}
