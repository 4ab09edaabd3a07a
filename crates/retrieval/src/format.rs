//! Grounding context rendering.

use serde_json::Value;

use crate::types::SearchResult;

/// Context used when nothing was found, so the prompt slot is never blank.
pub const NO_RELEVANT_DATA: &str = "No relevant records were found in the database for this question.";

/// Render ranked results as the text block handed to the model.
///
/// Sections follow ranking order. Record identifiers are never printed and
/// field values are never truncated.
pub fn format_context(results: &[SearchResult], query: &str) -> String {
    if results.is_empty() {
        return NO_RELEVANT_DATA.to_string();
    }

    let mut out = format!("Records relevant to the question: {}\n", query.trim());

    for result in results {
        out.push_str(&format!("\n## Collection: {}\n", result.collection));

        for (i, record) in result.records.iter().enumerate() {
            if i > 0 {
                out.push_str("---\n");
            }
            for (field, value) in &record.fields {
                if let Some(text) = render_value(value) {
                    out.push_str(&format!("{}: {}\n", field, text));
                }
            }
        }
    }

    out
}

/// Text for one field value; `None` for nulls.
pub(crate) fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use serde_json::json;

    fn result(name: &str, docs: Vec<Value>) -> SearchResult {
        SearchResult {
            collection: name.to_string(),
            records: docs
                .into_iter()
                .map(|d| Record::from_document(d, "_id").unwrap())
                .collect(),
            relevance_score: 1.0,
        }
    }

    #[test]
    fn test_empty_results_give_sentinel() {
        let context = format_context(&[], "anything");
        assert_eq!(context, NO_RELEVANT_DATA);
        assert!(!context.is_empty());
    }

    #[test]
    fn test_sections_and_separators() {
        let results = vec![
            result(
                "fees",
                vec![
                    json!({"_id": "secret-1", "title": "Tuition", "amount": 1200}),
                    json!({"_id": "secret-2", "title": "Housing", "note": null}),
                ],
            ),
            result("library", vec![json!({"hours": "8-22", "open": true})]),
        ];

        let context = format_context(&results, " tuition? ");
        let expected = "Records relevant to the question: tuition?\n\
                        \n## Collection: fees\n\
                        title: Tuition\n\
                        amount: 1200\n\
                        ---\n\
                        title: Housing\n\
                        \n## Collection: library\n\
                        hours: 8-22\n\
                        open: true\n";
        assert_eq!(context, expected);
        assert!(!context.contains("secret"));
    }

    #[test]
    fn test_nested_values_as_compact_json() {
        let results = vec![result("x", vec![json!({"tags": ["a", "b"], "meta": {"k": 1}})])];
        let context = format_context(&results, "q");
        assert!(context.contains("tags: [\"a\",\"b\"]"));
        assert!(context.contains("meta: {\"k\":1}"));
    }

    #[test]
    fn test_long_values_not_truncated() {
        let long = "x".repeat(5000);
        let results = vec![result("x", vec![json!({ "body": long.clone() })])];
        assert!(format_context(&results, "q").contains(&long));
    }
}
