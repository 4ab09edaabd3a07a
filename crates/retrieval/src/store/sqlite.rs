//! SQLite-backed document store.
//!
//! Records are stored as JSON bodies keyed by `(collection, record_id)`.
//! Collections enumerate in first-insertion order. A collection gains native
//! text search once `create_text_index` fills the FTS5 table for it.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use super::{DocumentStore, Predicate};
use crate::keywords::text_terms;
use crate::types::Record;
use sanad_core::{AppError, AppResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    record_id TEXT NOT NULL,
    body TEXT NOT NULL,
    UNIQUE (collection, record_id)
);

CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection, seq);

CREATE TABLE IF NOT EXISTS text_indexes (
    collection TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS records_fts USING fts5(
    collection UNINDEXED,
    text
);
"#;

fn sql_error(e: rusqlite::Error) -> AppError {
    AppError::StoreUnavailable(format!("SQLite query failed: {}", e))
}

fn parse_body(record_id: String, body: &str) -> AppResult<Record> {
    let fields: Map<String, Value> = serde_json::from_str(body).map_err(|e| {
        AppError::StoreUnavailable(format!("Corrupt record body for {}: {}", record_id, e))
    })?;
    Ok(Record::new(record_id, fields))
}

/// Concatenated string fields indexed for text search.
fn index_text(record: &Record) -> String {
    record
        .string_fields()
        .map(|(_, value)| value)
        .collect::<Vec<_>>()
        .join("\n")
}

/// FTS5 query OR-ing every non-stop-word as a quoted phrase.
fn fts_query(query: &str) -> Option<String> {
    let words = text_terms(query);
    if words.is_empty() {
        return None;
    }

    Some(
        words
            .iter()
            .map(|w| format!("\"{}\"", w.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

/// Document store on a single SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::StoreUnavailable(format!("Failed to create store directory: {}", e))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to open SQLite store {:?}: {}", path, e))
        })?;

        tracing::debug!("Opened SQLite store at {:?}", path);
        Self::from_connection(conn)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory().map_err(sql_error)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA).map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to create tables: {}", e))
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run blocking SQLite work off the async executor.
    async fn run<T, F>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| {
                AppError::StoreUnavailable("SQLite connection lock poisoned".to_string())
            })?;
            op(&mut *guard)
        })
        .await
        .map_err(|e| AppError::StoreUnavailable(format!("SQLite task failed: {}", e)))?
    }

    /// Insert or replace records of a collection in one transaction.
    ///
    /// Replacing keeps a record's position in the collection. Collections
    /// with a text index have their FTS rows refreshed.
    pub async fn upsert_records(&self, collection: &str, records: Vec<Record>) -> AppResult<usize> {
        let collection = collection.to_string();

        self.run(move |conn| {
            let tx = conn.transaction().map_err(sql_error)?;
            let indexed: bool = tx
                .query_row(
                    "SELECT COUNT(*) > 0 FROM text_indexes WHERE collection = ?1",
                    params![collection],
                    |row| row.get(0),
                )
                .map_err(sql_error)?;

            let count = records.len();
            for record in &records {
                let body = serde_json::to_string(&record.fields)?;
                tx.execute(
                    "INSERT INTO records (collection, record_id, body) VALUES (?1, ?2, ?3)
                     ON CONFLICT(collection, record_id) DO UPDATE SET body = excluded.body",
                    params![collection, record.id, body],
                )
                .map_err(sql_error)?;

                if indexed {
                    let seq: i64 = tx
                        .query_row(
                            "SELECT seq FROM records WHERE collection = ?1 AND record_id = ?2",
                            params![collection, record.id],
                            |row| row.get(0),
                        )
                        .map_err(sql_error)?;
                    tx.execute("DELETE FROM records_fts WHERE rowid = ?1", params![seq])
                        .map_err(sql_error)?;
                    tx.execute(
                        "INSERT INTO records_fts (rowid, collection, text) VALUES (?1, ?2, ?3)",
                        params![seq, collection, index_text(record)],
                    )
                    .map_err(sql_error)?;
                }
            }

            tx.commit().map_err(sql_error)?;
            tracing::debug!("Upserted {} records into '{}'", count, collection);
            Ok(count)
        })
        .await
    }

    /// Build (or rebuild) the text index of a collection.
    pub async fn create_text_index(&self, collection: &str) -> AppResult<usize> {
        let collection = collection.to_string();

        self.run(move |conn| {
            let tx = conn.transaction().map_err(sql_error)?;

            tx.execute(
                "INSERT OR REPLACE INTO text_indexes (collection, created_at) VALUES (?1, ?2)",
                params![collection, Utc::now().to_rfc3339()],
            )
            .map_err(sql_error)?;
            tx.execute(
                "DELETE FROM records_fts WHERE collection = ?1",
                params![collection],
            )
            .map_err(sql_error)?;

            let rows: Vec<(i64, String, String)> = {
                let mut stmt = tx
                    .prepare(
                        "SELECT seq, record_id, body FROM records WHERE collection = ?1 ORDER BY seq",
                    )
                    .map_err(sql_error)?;
                let mapped = stmt
                    .query_map(params![collection], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                    })
                    .map_err(sql_error)?;
                mapped
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(sql_error)?
            };

            for (seq, record_id, body) in &rows {
                let record = parse_body(record_id.clone(), body)?;
                tx.execute(
                    "INSERT INTO records_fts (rowid, collection, text) VALUES (?1, ?2, ?3)",
                    params![seq, collection, index_text(&record)],
                )
                .map_err(sql_error)?;
            }

            tx.commit().map_err(sql_error)?;
            tracing::info!("Indexed {} records of '{}' for text search", rows.len(), collection);
            Ok(rows.len())
        })
        .await
    }

    /// Number of records per collection, in enumeration order.
    pub async fn collection_counts(&self) -> AppResult<Vec<(String, usize)>> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT collection, COUNT(*) FROM records GROUP BY collection ORDER BY MIN(seq)",
                )
                .map_err(sql_error)?;
            let rows = stmt
                .query_map([], |row| {
                    let count: i64 = row.get(1)?;
                    Ok((row.get::<_, String>(0)?, count as usize))
                })
                .map_err(sql_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(sql_error)
        })
        .await
    }
}

#[async_trait::async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn list_collections(&self) -> AppResult<Vec<String>> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare("SELECT collection FROM records GROUP BY collection ORDER BY MIN(seq)")
                .map_err(sql_error)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(sql_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(sql_error)
        })
        .await
    }

    async fn find_one(&self, collection: &str) -> AppResult<Option<Record>> {
        let collection = collection.to_string();
        self.run(move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT record_id, body FROM records WHERE collection = ?1 ORDER BY seq LIMIT 1",
                    params![collection],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(sql_error)?;

            row.map(|(id, body)| parse_body(id, &body)).transpose()
        })
        .await
    }

    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        let collection = collection.to_string();
        let predicate = predicate.clone();

        self.run(move |conn| {
            let mut stmt = conn
                .prepare("SELECT record_id, body FROM records WHERE collection = ?1 ORDER BY seq")
                .map_err(sql_error)?;
            let mut rows = stmt.query(params![collection]).map_err(sql_error)?;

            let mut found = Vec::new();
            while found.len() < limit {
                let Some(row) = rows.next().map_err(sql_error)? else {
                    break;
                };
                let id: String = row.get(0).map_err(sql_error)?;
                let body: String = row.get(1).map_err(sql_error)?;
                let record = parse_body(id, &body)?;
                if predicate.matches(&record) {
                    found.push(record);
                }
            }
            Ok(found)
        })
        .await
    }

    async fn has_text_index(&self, collection: &str) -> AppResult<bool> {
        let collection = collection.to_string();
        self.run(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) > 0 FROM text_indexes WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )
            .map_err(sql_error)
        })
        .await
    }

    async fn text_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<Record>> {
        let Some(match_expr) = fts_query(query) else {
            return Ok(Vec::new());
        };
        let collection = collection.to_string();

        self.run(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT records.record_id, records.body
                     FROM records_fts
                     JOIN records ON records.seq = records_fts.rowid
                     WHERE records_fts MATCH ?1 AND records_fts.collection = ?2
                     ORDER BY rank
                     LIMIT ?3",
                )
                .map_err(sql_error)?;
            let rows = stmt
                .query_map(params![match_expr, collection, limit as i64], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(sql_error)?;

            let mut found = Vec::new();
            for row in rows {
                let (id, body) = row.map_err(sql_error)?;
                found.push(parse_body(id, &body)?);
            }
            Ok(found)
        })
        .await
    }
}
