/// Stable JSON report for a judged run
/// The v1 contract is frozen; new fields must be optional.
use crate::config::types::{Question, Result, Scalar, SqlboxError};
use crate::core::session::RunOutcome;
use crate::verdict::VerdictCause;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

/// Run status (stable taxonomy)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Correct,
    Incorrect,
    /// Validation, execution or schema failure; see `error`
    Error,
}

/// Stable JSON report for consumers of `sqlbox run --json` (v1)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReportV1 {
    /// Schema version (always "1.0" for v1)
    pub schema_version: String,

    pub question_id: u32,
    pub question_title: String,

    /// SHA256 of the question's schema and expected result
    pub question_fingerprint: String,

    pub status: RunStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict_cause: Option<VerdictCause>,

    /// Displayed result columns (empty on error or non-tabular output)
    pub columns: Vec<String>,

    /// Displayed result rows
    pub rows: Vec<Vec<Scalar>>,

    /// Number of statements the engine executed
    pub statement_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Machine-readable error kind, see [`SqlboxError::kind`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Wall time of execution and judging (seconds)
    pub wall_time: f64,

    /// RFC3339 timestamp of run start
    pub execution_start: String,

    /// RFC3339 timestamp of run end
    pub execution_end: String,
}

impl RunReportV1 {
    fn base(question: &Question, status: RunStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            question_id: question.id,
            question_title: question.title.clone(),
            question_fingerprint: question.fingerprint(),
            status,
            verdict_cause: None,
            columns: Vec::new(),
            rows: Vec::new(),
            statement_count: 0,
            error: None,
            error_kind: None,
            wall_time: 0.0,
            execution_start: start.to_rfc3339(),
            execution_end: end.to_rfc3339(),
        }
    }

    /// Report for a run that produced a verdict
    pub fn from_outcome(
        question: &Question,
        outcome: &RunOutcome,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let status = if outcome.verdict.correct {
            RunStatus::Correct
        } else {
            RunStatus::Incorrect
        };
        Self {
            verdict_cause: Some(outcome.verdict.cause),
            columns: outcome.displayed.columns.clone(),
            rows: outcome.displayed.rows.clone(),
            statement_count: outcome.results.len(),
            wall_time: outcome.elapsed.as_secs_f64(),
            ..Self::base(question, status, start, end)
        }
    }

    /// Report for a run that failed before a verdict
    pub fn from_error(
        question: &Question,
        error: &SqlboxError,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
            wall_time: (end - start).num_microseconds().unwrap_or(0).max(0) as f64 / 1e6,
            ..Self::base(question, RunStatus::Error, start, end)
        }
    }

    pub fn is_correct(&self) -> bool {
        self.status == RunStatus::Correct
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SqlboxError::Config(format!("Failed to serialize report to JSON: {}", e)))
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            SqlboxError::Config(format!("Failed to deserialize report from JSON: {}", e))
        })
    }

    /// Validate schema version
    pub fn validate_schema_version(&self) -> Result<()> {
        if self.schema_version != REPORT_SCHEMA_VERSION {
            return Err(SqlboxError::Config(format!(
                "Unsupported schema version: {}",
                self.schema_version
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets::fallback_questions;
    use crate::config::types::ResultSet;
    use crate::verdict::Verdict;
    use std::time::Duration;

    fn timestamps() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = DateTime::parse_from_rfc3339("2026-02-08T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        (start, start + chrono::Duration::milliseconds(250))
    }

    fn correct_outcome() -> RunOutcome {
        let displayed = ResultSet::new(
            vec!["name".to_string()],
            vec![vec![Scalar::from("Bob Johnson")], vec![Scalar::from("John Doe")]],
        )
        .unwrap();
        RunOutcome {
            results: vec![displayed.clone()],
            displayed,
            verdict: Verdict {
                correct: true,
                cause: VerdictCause::Match,
            },
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_outcome_report_fields() {
        let question = &fallback_questions()[1];
        let (start, end) = timestamps();
        let report = RunReportV1::from_outcome(question, &correct_outcome(), start, end);

        assert!(report.is_correct());
        assert_eq!(report.question_id, 2);
        assert_eq!(report.statement_count, 1);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.execution_start, "2026-02-08T10:00:00+00:00");

        let json = report.to_json().unwrap();
        assert!(json.contains("\"status\": \"correct\""));
        assert!(json.contains("\"verdict_cause\": \"match\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_error_report_round_trips() {
        let question = &fallback_questions()[0];
        let (start, end) = timestamps();
        let err = SqlboxError::Execution("near \"SELEC\": syntax error".to_string());
        let report = RunReportV1::from_error(question, &err, start, end);

        assert_eq!(report.status, RunStatus::Error);
        assert_eq!(report.error_kind.as_deref(), Some("execution"));
        assert_eq!(report.wall_time, 0.25);

        let parsed = RunReportV1::from_json(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("near \"SELEC\": syntax error"));
        assert!(parsed.validate_schema_version().is_ok());
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let question = &fallback_questions()[0];
        let (start, end) = timestamps();
        let mut report = RunReportV1::from_outcome(question, &correct_outcome(), start, end);
        report.schema_version = "2.0".to_string();
        assert!(report.validate_schema_version().is_err());
    }
}
