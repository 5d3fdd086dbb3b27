//! End-to-end judging scenarios against the embedded SQLite engine.
//!
//! Every test runs on the built-in question set: employees seeded with
//! four rows (questions 1 and 2) or five rows (questions 3 and 4).

use sqlbox::catalog::QuestionAggregator;
use sqlbox::engine::sqlite::SqliteEngine;
use sqlbox::{Session, SessionState, SqlboxError, VerdictCause};
use std::sync::Arc;

async fn session_on(question_index: usize) -> Session {
    let engine = SqliteEngine::init().expect("bundled SQLite must initialize");
    let mut session = Session::new(QuestionAggregator::offline(), Arc::new(engine));
    session.reload().await;
    session.select(question_index).unwrap();
    assert!(matches!(session.state(), SessionState::SandboxReady { .. }));
    session
}

#[tokio::test]
async fn test_exact_match() {
    let mut session = session_on(0).await;
    let outcome = session.submit("SELECT * FROM employees").unwrap();

    assert!(outcome.verdict.correct);
    assert_eq!(
        outcome.displayed.columns,
        vec!["id", "name", "department", "salary"]
    );
    assert_eq!(outcome.displayed.row_count(), 4);
}

#[tokio::test]
async fn test_row_order_does_not_matter() {
    let mut session = session_on(1).await;
    let outcome = session
        .submit("SELECT name FROM employees WHERE department = 'Engineering' ORDER BY name")
        .unwrap();

    // Bob Johnson sorts before John Doe; the expected rows are the other way round
    assert_eq!(outcome.displayed.rows[0][0].to_string(), "Bob Johnson");
    assert!(outcome.verdict.correct);
}

#[tokio::test]
async fn test_column_case_and_order_do_not_matter() {
    let mut session = session_on(3).await;
    let outcome = session
        .submit("SELECT SALARY, Name FROM employees WHERE salary > 70000")
        .unwrap();
    assert!(outcome.verdict.correct);
}

#[tokio::test]
async fn test_missing_alias_is_column_mismatch() {
    let mut session = session_on(2).await;
    let outcome = session
        .submit("SELECT department, AVG(salary) FROM employees GROUP BY department")
        .unwrap();

    assert!(!outcome.verdict.correct);
    assert_eq!(outcome.verdict.cause, VerdictCause::ColumnMismatch);
}

#[tokio::test]
async fn test_aliased_average_matches_integer_expectation() {
    let mut session = session_on(2).await;
    let outcome = session
        .submit(
            "SELECT department, AVG(salary) AS avg_salary FROM employees \
             GROUP BY department ORDER BY department",
        )
        .unwrap();
    assert!(outcome.verdict.correct, "cause: {:?}", outcome.verdict.cause);
}

#[tokio::test]
async fn test_blank_query_is_validation_error() {
    let mut session = session_on(0).await;
    for query in ["", "  \n\t"] {
        let err = session.submit(query).unwrap_err();
        assert!(matches!(err, SqlboxError::Validation(_)));
    }
    assert_eq!(session.state(), &SessionState::SandboxReady { selected: 0 });
}

#[tokio::test]
async fn test_malformed_sql_clears_previous_result() {
    let mut session = session_on(0).await;
    assert!(session.submit("SELECT * FROM employees").unwrap().verdict.correct);

    let err = session.submit("SELEC * FROM employees").unwrap_err();
    assert!(matches!(err, SqlboxError::Execution(_)));
    assert!(err.to_string().contains("syntax error"));

    match session.state() {
        SessionState::RunFailed { selected, error } => {
            assert_eq!(*selected, 0);
            assert_eq!(error, &err.to_string());
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_rows_keep_columns() {
    let mut session = session_on(1).await;
    let outcome = session
        .submit("SELECT name FROM employees WHERE department = 'Legal'")
        .unwrap();

    assert_eq!(outcome.displayed.columns, vec!["name"]);
    assert_eq!(outcome.displayed.row_count(), 0);
    assert_eq!(outcome.verdict.cause, VerdictCause::RowCountMismatch);
}

#[tokio::test]
async fn test_statement_without_output_is_no_result() {
    let mut session = session_on(0).await;
    let outcome = session
        .submit("UPDATE employees SET salary = salary + 1")
        .unwrap();

    assert!(!outcome.displayed.is_tabular());
    assert_eq!(outcome.verdict.cause, VerdictCause::NoResult);
}

#[tokio::test]
async fn test_first_tabular_statement_is_judged() {
    let mut session = session_on(0).await;
    let outcome = session
        .submit("CREATE TABLE scratch (a INTEGER); SELECT * FROM employees; SELECT 1 AS one;")
        .unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.verdict.correct);
}

#[tokio::test]
async fn test_switching_questions_discards_learner_changes() {
    let mut session = session_on(0).await;
    session.submit("DELETE FROM employees").unwrap();
    let emptied = session.submit("SELECT * FROM employees").unwrap();
    assert_eq!(emptied.verdict.cause, VerdictCause::RowCountMismatch);

    // Same question again: the sandbox and its changes stay
    session.select(0).unwrap();
    let still_empty = session.submit("SELECT * FROM employees").unwrap();
    assert_eq!(still_empty.verdict.cause, VerdictCause::RowCountMismatch);

    session.select(1).unwrap();
    session.select(0).unwrap();
    assert!(session.submit("SELECT * FROM employees").unwrap().verdict.correct);
}

#[tokio::test]
async fn test_broken_schema_blocks_runs_until_reselect() {
    let engine = SqliteEngine::init().unwrap();
    let mut session = Session::new(QuestionAggregator::offline(), Arc::new(engine));
    session.reload().await;

    let broken = serde_json::json!({
        "title": "Broken",
        "difficulty": "Easy",
        "description": "schema has a typo",
        "schema": "CREATE TABEL t (x INTEGER);",
        "expectedResult": { "columns": ["x"], "values": [] }
    })
    .to_string();
    session.import(&broken, "broken.json").unwrap();
    session.select(4).unwrap();

    assert!(matches!(
        session.state(),
        SessionState::QuestionsReady { selected: 4, .. }
    ));
    assert!(matches!(
        session.submit("SELECT 1"),
        Err(SqlboxError::NoSandbox)
    ));

    session.select(0).unwrap();
    assert!(session.submit("SELECT * FROM employees").unwrap().verdict.correct);
}
