//! Pipeline properties: fallbacks, ordering and store failures.

use std::sync::Arc;
use std::time::Duration;

use sanad_core::AppError;
use sanad_llm::MockLlmClient;
use serde_json::json;

use super::support::{orchestrator, university_store, CountingStore};
use crate::config::RetrievalConfig;
use crate::lookup::LookupTable;
use crate::orchestrator::APOLOGY;
use crate::scanner::scan;
use crate::store::{ingest_paths, MemoryStore, SqliteStore};
use crate::training::train;

#[tokio::test]
async fn test_every_nonempty_collection_yields_records_repeatably() {
    let client = Arc::new(MockLlmClient::new("ok"));
    let orchestrator =
        orchestrator(university_store(), client, RetrievalConfig::default()).await;

    let first = orchestrator.inspect_search("zzz qqq").await.unwrap();
    let second = orchestrator.inspect_search("zzz qqq").await.unwrap();

    assert_eq!(first.ranked_results.len(), 3);
    assert!(first.ranked_results.iter().all(|r| !r.records.is_empty()));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_equal_scores_keep_catalog_order() {
    let store = Arc::new(MemoryStore::new());
    for name in ["zeta", "alpha", "mid"] {
        store
            .insert_documents(name, vec![json!({"note": "campus parking"})], "_id")
            .unwrap();
    }
    let orchestrator = orchestrator(
        store,
        Arc::new(MockLlmClient::new("ok")),
        RetrievalConfig::default(),
    )
    .await;

    let inspection = orchestrator.inspect_search("parking").await.unwrap();
    let names: Vec<_> = inspection
        .ranked_results
        .iter()
        .map(|r| r.collection.as_str())
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[tokio::test]
async fn test_store_failure_apologizes_but_inspection_reports() {
    let store = Arc::new(CountingStore::new(university_store()).failing());
    let client = Arc::new(MockLlmClient::new("unused"));
    let orchestrator =
        orchestrator(store.clone(), Arc::clone(&client), RetrievalConfig::default()).await;

    let answer = orchestrator.answer("tuition", &[]).await;
    assert_eq!(answer.text, APOLOGY);
    assert!(!answer.text.contains("connection refused"));
    assert_eq!(client.call_count(), 0);

    let err = orchestrator.inspect_search("tuition").await.unwrap_err();
    assert!(matches!(err, AppError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let store = Arc::new(CountingStore::new(university_store()).stalling(Duration::from_secs(5)));
    let config = RetrievalConfig {
        store_timeout_secs: 1,
        ..RetrievalConfig::default()
    };
    let orchestrator = orchestrator(store, Arc::new(MockLlmClient::new("unused")), config).await;

    let err = orchestrator.inspect_search("tuition").await.unwrap_err();
    assert!(matches!(err, AppError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_lookup_miss_falls_through_to_search() {
    let store = Arc::new(CountingStore::new(university_store()));
    let client = Arc::new(MockLlmClient::new("Linear Algebra is a Mathematics course."));
    let orchestrator =
        orchestrator(store.clone(), Arc::clone(&client), RetrievalConfig::default()).await;

    let mut table = LookupTable::new();
    table.insert("where is the library", "Building B.", Vec::new());
    orchestrator.lookup().swap(table);

    let answer = orchestrator.answer("linear algebra course", &[]).await;
    assert!(answer.used_search);
    assert_eq!(answer.confidence, None);
    assert!(store.search_calls() > 0);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_rescan_picks_up_new_collections() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = orchestrator(
        store.clone(),
        Arc::new(MockLlmClient::new("ok")),
        RetrievalConfig::default(),
    )
    .await;
    assert!(orchestrator.collections().is_empty());

    store
        .insert_documents("events", vec![json!({"title": "Open day"})], "_id")
        .unwrap();
    assert_eq!(orchestrator.rescan().await.unwrap(), 1);

    let inspection = orchestrator.inspect_search("open day").await.unwrap();
    assert_eq!(inspection.ranked_results[0].collection, "events");
}

#[tokio::test]
async fn test_sqlite_ingest_index_train_and_answer() {
    let temp = tempfile::TempDir::new().unwrap();
    let data = temp.path().join("fees.json");
    std::fs::write(
        &data,
        r#"[
            {"_id": "f1", "title": "Tuition fees", "details": "Undergraduate tuition is 1200 SAR per term"},
            {"_id": "f2", "title": "Housing fees", "details": "Dormitory rooms cost 300 SAR per month"}
        ]"#,
    )
    .unwrap();

    let sqlite = Arc::new(SqliteStore::open(&temp.path().join("store.sqlite")).unwrap());
    let stats = ingest_paths(&sqlite, "fees", &[data], "_id").await.unwrap();
    assert_eq!(stats.documents, 2);
    sqlite.create_text_index("fees").await.unwrap();

    let collections = scan(sqlite.as_ref(), "_id").await.unwrap();
    let table = train(sqlite.as_ref(), &collections, "_id").await.unwrap();
    assert!(table.get_exact("tell me about housing fees").is_some());

    let client = Arc::new(MockLlmClient::new("300 SAR per month."));
    let orchestrator =
        orchestrator(sqlite, Arc::clone(&client), RetrievalConfig::default()).await;

    let inspection = orchestrator.inspect_search("dormitory").await.unwrap();
    assert_eq!(inspection.relevant_data_count, 1);
    assert!(inspection.formatted_context.contains("Dormitory rooms"));

    orchestrator.lookup().swap(table);
    let answer = orchestrator.answer("Tell me about housing fees", &[]).await;
    assert!(!answer.used_search);
    assert!(answer.text.contains("300 SAR per month"));
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_text_index_search_skips_stop_word_matches() {
    let store = Arc::new(MemoryStore::new());
    let mut documents: Vec<_> = (0..6)
        .map(|i| json!({"title": format!("The cafeteria menu {}", i)}))
        .collect();
    documents.push(json!({"_id": "lib", "title": "Library opening hours"}));
    store.insert_documents("campus", documents, "_id").unwrap();
    store.enable_text_index("campus").unwrap();

    let orchestrator = orchestrator(
        store,
        Arc::new(MockLlmClient::new("unused")),
        RetrievalConfig::default(),
    )
    .await;

    let inspection = orchestrator
        .inspect_search("what are the library hours")
        .await
        .unwrap();
    let records = &inspection.ranked_results[0].records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "lib");
    assert!(!inspection.formatted_context.contains("cafeteria"));
}

#[tokio::test]
async fn test_trained_table_does_not_answer_other_subjects() {
    let memory = Arc::new(MemoryStore::new());
    memory
        .insert_documents(
            "library",
            vec![json!({"_id": "l1", "name": "Central Library", "hours": "8-22"})],
            "_id",
        )
        .unwrap();
    memory
        .insert_documents(
            "parking",
            vec![json!({"_id": "p1", "title": "Visitor permits", "note": "Gate 3 after 16:00"})],
            "_id",
        )
        .unwrap();

    let collections = scan(memory.as_ref(), "_id").await.unwrap();
    let trained = train(memory.as_ref(), &collections, "_id").await.unwrap();
    // only the library is known to the table
    let table = LookupTable::from_entries(
        trained
            .entries()
            .iter()
            .filter(|e| e.source_tags.contains("library"))
            .cloned()
            .collect::<Vec<_>>(),
    );

    let store = Arc::new(CountingStore::new(memory));
    let client = Arc::new(MockLlmClient::new("Visitors park at gate 3."));
    let orchestrator =
        orchestrator(store.clone(), Arc::clone(&client), RetrievalConfig::default()).await;
    orchestrator.lookup().swap(table);

    let answer = orchestrator.answer("tell me about visitor parking", &[]).await;
    assert!(answer.used_search);
    assert_eq!(answer.text, "Visitors park at gate 3.");
    assert_eq!(answer.confidence, None);
    assert!(store.search_calls() > 0);
    assert_eq!(client.call_count(), 1);

    let answer = orchestrator.answer("tell me about the central library", &[]).await;
    assert!(!answer.used_search);
    assert_eq!(answer.text, "name: Central Library\nhours: 8-22");
}
