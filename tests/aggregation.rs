//! Question aggregation across sources, fallback and import.

use async_trait::async_trait;
use sqlbox::catalog::{DirectorySource, ListOrigin, QuestionAggregator, QuestionSource, SourceEntry};
use sqlbox::config::presets::fallback_questions;
use sqlbox::{Result, SqlboxError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Source whose listing always fails, counting how often it was asked.
struct UnreachableSource {
    listings: Arc<AtomicUsize>,
}

#[async_trait]
impl QuestionSource for UnreachableSource {
    fn describe(&self) -> String {
        "unreachable".to_string()
    }

    async fn list_entries(&self) -> Result<Vec<SourceEntry>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Err(SqlboxError::Load("connection refused".to_string()))
    }

    async fn fetch(&self, entry: &SourceEntry) -> Result<Vec<u8>> {
        Err(SqlboxError::Load(format!("unexpected fetch of {}", entry.name)))
    }
}

fn document(title: &str) -> String {
    serde_json::json!({
        "title": title,
        "difficulty": "Medium",
        "description": "Count the rows.",
        "schema": "CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2);",
        "expectedResult": { "columns": ["n"], "values": [[2]] },
        "hint": "COUNT(*)"
    })
    .to_string()
}

#[tokio::test]
async fn test_listing_failure_serves_builtin_questions_in_order() {
    let listings = Arc::new(AtomicUsize::new(0));
    let source = UnreachableSource {
        listings: listings.clone(),
    };
    let mut aggregator = QuestionAggregator::new(Box::new(source), vec!["json".to_string()]);

    let questions = aggregator.load_questions().await.to_vec();

    assert_eq!(listings.load(Ordering::SeqCst), 1);
    assert_eq!(questions.len(), 4);
    assert_eq!(
        questions.iter().map(|q| q.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(questions, fallback_questions());
    assert_eq!(aggregator.origin(), ListOrigin::Fallback);
}

#[tokio::test]
async fn test_directory_source_skips_bad_documents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("01-count.json"), document("Count")).unwrap();
    std::fs::write(dir.path().join("02-broken.json"), "{ \"title\": ").unwrap();
    std::fs::write(dir.path().join("03-notes.txt"), document("Not a question file")).unwrap();
    std::fs::write(dir.path().join("04-again.json"), document("Count Again")).unwrap();

    let mut aggregator = QuestionAggregator::new(
        Box::new(DirectorySource::new(dir.path())),
        vec!["json".to_string()],
    );
    let questions = aggregator.load_questions().await;

    let summary: Vec<(u32, &str, &str)> = questions
        .iter()
        .map(|q| (q.id, q.title.as_str(), q.source_name.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Count", "01-count.json"),
            (2, "Count Again", "04-again.json"),
        ]
    );
    assert_eq!(aggregator.origin(), ListOrigin::Source);
}

#[tokio::test]
async fn test_empty_directory_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut aggregator = QuestionAggregator::new(
        Box::new(DirectorySource::new(dir.path())),
        vec!["json".to_string()],
    );
    assert_eq!(aggregator.load_questions().await.len(), 4);
    assert_eq!(aggregator.origin(), ListOrigin::Fallback);
}

#[tokio::test]
async fn test_import_appends_after_fallback() {
    let mut aggregator = QuestionAggregator::offline();
    aggregator.load_questions().await;

    let batch = format!("[{}, {}]", document("One"), document("Two"));
    let imported = aggregator.import_local(&batch).unwrap();

    assert_eq!(imported.len(), 2);
    assert_eq!(aggregator.len(), 6);
    assert_eq!(aggregator.get(4).unwrap().title, "One");
    assert_eq!(aggregator.get(5).unwrap().id, 6);
    assert_eq!(aggregator.get(5).unwrap().source_name, "local-import");
}

#[tokio::test]
async fn test_one_bad_record_rejects_whole_import() {
    let mut aggregator = QuestionAggregator::offline();
    aggregator.load_questions().await;

    let batch = format!(
        "[{}, {{\"title\": \"missing everything else\"}}]",
        document("Fine")
    );
    let err = aggregator.import_local(&batch).unwrap_err();

    assert!(matches!(err, SqlboxError::Import(_)));
    assert!(err.to_string().contains("question #2"));
    assert_eq!(aggregator.len(), 4);
}
