//! Lookup table training from stored records.
//!
//! Every record yields a handful of templated questions in English and
//! Arabic that all map to the record's rendered fields.

use crate::format::render_value;
use crate::keywords::KeywordExtractor;
use crate::lookup::LookupTable;
use crate::store::{DocumentStore, Predicate};
use crate::types::{Collection, Record};
use sanad_core::AppResult;

const TITLE_FIELDS: &[&str] = &["title", "name", "subject"];

const TITLE_TEMPLATES: &[&str] = &[
    "summarize the content about {}",
    "give me an overview of {}",
    "what information do you have about {}",
    "tell me about {}",
    "ملخص المعلومات عن {}",
    "أعطني نظرة عامة عن {}",
    "أخبرني عن {}",
];

const KEYWORD_TEMPLATES: &[&str] = &[
    "what do you know about {}",
    "ما هي المعلومات المتوفرة عن {}",
];

/// Values longer than this many characters also yield keyword questions.
const LONG_VALUE_CHARS: usize = 50;

/// Keywords used in questions must be longer than this.
const MIN_KEYWORD_CHARS: usize = 5;

fn fill(template: &str, subject: &str) -> String {
    template.replace("{}", subject)
}

/// `field: value` lines of a record, skipping the identifier field.
fn answer_text(record: &Record, id_field: &str) -> String {
    record
        .fields
        .iter()
        .filter(|(field, _)| field.as_str() != id_field)
        .filter_map(|(field, value)| render_value(value).map(|text| format!("{}: {}", field, text)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First keyword of a long value that is long enough to be distinctive.
fn value_keyword(extractor: &KeywordExtractor, value: &str) -> Option<String> {
    if value.chars().count() <= LONG_VALUE_CHARS {
        return None;
    }
    extractor
        .extract(value)
        .into_iter()
        .find(|k| k.chars().count() > MIN_KEYWORD_CHARS)
}

/// Add the questions of one record. Returns how many were new.
fn train_record(
    table: &mut LookupTable,
    extractor: &KeywordExtractor,
    collection: &str,
    record: &Record,
    id_field: &str,
) -> usize {
    let answer = answer_text(record, id_field);
    if answer.is_empty() {
        return 0;
    }

    let tags = [collection.to_string(), record.id.clone()];
    let title = record
        .first_string(TITLE_FIELDS)
        .map(str::to_string)
        .unwrap_or_else(|| record.id.clone());

    let mut questions: Vec<String> = TITLE_TEMPLATES
        .iter()
        .map(|template| fill(template, title.trim()))
        .collect();

    for (_, value) in record.string_fields() {
        if let Some(keyword) = value_keyword(extractor, value) {
            questions.extend(KEYWORD_TEMPLATES.iter().map(|t| fill(t, &keyword)));
        }
    }

    questions
        .iter()
        .filter(|question| table.insert(question, answer.clone(), tags.iter().cloned()))
        .count()
}

/// Build a lookup table from every record of every collection.
pub async fn train(
    store: &dyn DocumentStore,
    collections: &[Collection],
    id_field: &str,
) -> AppResult<LookupTable> {
    let extractor = KeywordExtractor::new(usize::MAX);
    let mut table = LookupTable::new();

    for collection in collections {
        let records = store
            .find(&collection.name, &Predicate::All, usize::MAX)
            .await?;

        let added: usize = records
            .iter()
            .map(|record| train_record(&mut table, &extractor, &collection.name, record, id_field))
            .sum();

        tracing::info!(
            "Trained {} questions from {} records of '{}'",
            added,
            records.len(),
            collection.name
        );
    }

    tracing::info!("Lookup table holds {} entries", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::canonicalize;
    use crate::scanner::scan;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn trained(store: &MemoryStore) -> LookupTable {
        let collections = scan(store, "_id").await.unwrap();
        train(store, &collections, "_id").await.unwrap()
    }

    #[tokio::test]
    async fn test_title_templates_in_both_languages() {
        let store = MemoryStore::new();
        store
            .insert_documents(
                "library",
                vec![json!({"_id": "l1", "name": "Central Library", "hours": "8-22"})],
                "_id",
            )
            .unwrap();

        let table = trained(&store).await;
        assert_eq!(table.len(), TITLE_TEMPLATES.len());

        let entry = table.get_exact("tell me about central library").unwrap();
        assert_eq!(entry.answer, "name: Central Library\nhours: 8-22");
        assert!(entry.source_tags.contains("library"));
        assert!(entry.source_tags.contains("l1"));
        assert!(table.get_exact(&canonicalize("أخبرني عن Central Library")).is_some());
    }

    #[tokio::test]
    async fn test_long_values_add_keyword_questions() {
        let store = MemoryStore::new();
        store
            .insert_documents(
                "programs",
                vec![json!({
                    "_id": "p1",
                    "title": "Computer Science",
                    "description": "The program covers algorithms, systems and software engineering in depth."
                })],
                "_id",
            )
            .unwrap();

        let table = trained(&store).await;
        // only the first long keyword of the value is used
        assert!(table.get_exact("what do you know about program").is_some());
        assert!(table.get_exact("ما هي المعلومات المتوفرة عن program").is_some());
        assert!(table.get_exact("what do you know about algorithms").is_none());
        // short titles never produce keyword questions
        assert!(table.get_exact("what do you know about computer").is_none());
    }

    #[tokio::test]
    async fn test_untitled_records_use_identifier() {
        let store = MemoryStore::new();
        store
            .insert_documents("misc", vec![json!({"_id": "m-7", "count": 3})], "_id")
            .unwrap();

        let table = trained(&store).await;
        assert!(table.get_exact("tell me about m 7").is_some());
    }

    #[tokio::test]
    async fn test_first_record_wins_on_shared_title() {
        let store = MemoryStore::new();
        store
            .insert_documents(
                "fees",
                vec![
                    json!({"_id": "a", "title": "Fees", "amount": 1}),
                    json!({"_id": "b", "title": "Fees", "amount": 2}),
                ],
                "_id",
            )
            .unwrap();

        let table = trained(&store).await;
        assert_eq!(
            table.get_exact("tell me about fees").unwrap().answer,
            "title: Fees\namount: 1"
        );
    }
}
