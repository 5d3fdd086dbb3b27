/// Core types and structures for the sqlbox system
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single cell value produced by the SQL engine or read from a question document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Real(r) => write!(f, "{r}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Named-column, ordered-row tabular value.
///
/// `columns == []` means the statement produced no tabular output, which is
/// distinct from a result with columns and zero rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    #[serde(rename = "values", alias = "rows")]
    pub rows: Vec<Vec<Scalar>>,
}

impl ResultSet {
    /// Build a result set, rejecting rows whose width differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        let set = Self { columns, rows };
        if let Some(idx) = set.first_misshapen_row() {
            return Err(SqlboxError::Config(format!(
                "row {} has {} values but {} columns were declared",
                idx,
                set.rows[idx].len(),
                set.columns.len()
            )));
        }
        Ok(set)
    }

    /// Result of a statement with no tabular output.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_tabular(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first row violating `row.len() == columns.len()`.
    pub fn first_misshapen_row(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.len() != self.columns.len())
    }
}

/// Exercise difficulty. Documents may carry free text outside the three known levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        match value.trim() {
            "Easy" | "easy" => Difficulty::Easy,
            "Medium" | "medium" => Difficulty::Medium,
            "Hard" | "hard" => Difficulty::Hard,
            _ => Difficulty::Other(value),
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
            Difficulty::Other(text) => write!(f, "{text}"),
        }
    }
}

/// An exercise record. Ids are session-local and reassigned on every load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
    /// DDL + seed SQL, executed verbatim when the sandbox is provisioned
    #[serde(rename = "schema")]
    pub schema_script: String,
    #[serde(rename = "expectedResult")]
    pub expected_result: ResultSet,
    #[serde(default)]
    pub hint: String,
    /// Origin file or identifier
    #[serde(rename = "sourceName", default)]
    pub source_name: String,
}

impl Question {
    /// SHA256 over the parts of the question that shape its sandbox and verdict.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let expected = serde_json::to_string(&self.expected_result).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(self.schema_script.as_bytes());
        hasher.update([0u8]);
        hasher.update(expected.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Diagnostic raised by the embedded engine, kept verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError(err.to_string())
    }
}

/// Custom error types for sqlbox
#[derive(Error, Debug)]
pub enum SqlboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SQL engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Error loading schema for question {question_id}: {message}")]
    Schema { question_id: u32, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    /// Engine diagnostic, surfaced unmodified
    #[error("{0}")]
    Execution(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("No sandbox is ready for the selected question")]
    NoSandbox,
}

impl SqlboxError {
    /// Short machine-readable kind used in reports and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlboxError::Io(_) => "io",
            SqlboxError::Config(_) => "config",
            SqlboxError::EngineUnavailable(_) => "engine_unavailable",
            SqlboxError::Load(_) => "load",
            SqlboxError::Schema { .. } => "schema",
            SqlboxError::Validation(_) => "validation",
            SqlboxError::Execution(_) => "execution",
            SqlboxError::Import(_) => "import",
            SqlboxError::NoSandbox => "no_sandbox",
        }
    }
}

/// Result type alias for sqlbox operations
pub type Result<T> = std::result::Result<T, SqlboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_deserializes_untagged() {
        let row: Vec<Scalar> = serde_json::from_str(r#"[1, 2.5, "x", null]"#).unwrap();
        assert_eq!(
            row,
            vec![
                Scalar::Integer(1),
                Scalar::Real(2.5),
                Scalar::Text("x".to_string()),
                Scalar::Null
            ]
        );
    }

    #[test]
    fn test_result_set_rejects_misshapen_rows() {
        let err = ResultSet::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Scalar::Integer(1)]],
        );
        assert!(err.is_err());

        let ok = ResultSet::new(vec!["a".to_string()], vec![vec![Scalar::Integer(1)]]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_empty_result_is_not_tabular() {
        assert!(!ResultSet::empty().is_tabular());
        let zero_rows = ResultSet::new(vec!["name".to_string()], vec![]).unwrap();
        assert!(zero_rows.is_tabular());
        assert_eq!(zero_rows.row_count(), 0);
    }

    #[test]
    fn test_difficulty_free_text() {
        let d: Difficulty = serde_json::from_str(r#""Expert""#).unwrap();
        assert_eq!(d, Difficulty::Other("Expert".to_string()));
        let d: Difficulty = serde_json::from_str(r#""Medium""#).unwrap();
        assert_eq!(d, Difficulty::Medium);
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), r#""Hard""#);
    }

    #[test]
    fn test_execution_error_is_verbatim() {
        let err = SqlboxError::Execution("near \"SELEC\": syntax error".to_string());
        assert_eq!(err.to_string(), "near \"SELEC\": syntax error");
        assert_eq!(err.kind(), "execution");
    }

    #[test]
    fn test_fingerprint_tracks_schema() {
        let mut q = Question {
            id: 1,
            title: "t".to_string(),
            difficulty: Difficulty::Easy,
            description: String::new(),
            schema_script: "CREATE TABLE a (x INTEGER);".to_string(),
            expected_result: ResultSet::empty(),
            hint: String::new(),
            source_name: String::new(),
        };
        let before = q.fingerprint();
        assert_eq!(before, q.fingerprint());
        q.schema_script.push_str("INSERT INTO a VALUES (1);");
        assert_ne!(before, q.fingerprint());
    }
}
