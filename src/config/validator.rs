/// Question document validation
///
/// Remote and imported documents are loosely typed JSON. Every record is
/// checked against the required question shape before it becomes a
/// [`Question`]; a record either passes as a [`QuestionDraft`] or is reported
/// as malformed with the first problem found.
use crate::config::types::{Difficulty, Question, Result, ResultSet, Scalar, SqlboxError};
use serde_json::{Map, Value};

/// A question record that passed validation but has no id yet.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionDraft {
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub schema_script: String,
    pub expected_result: ResultSet,
    pub hint: String,
}

impl QuestionDraft {
    pub fn into_question(self, id: u32, source_name: impl Into<String>) -> Question {
        Question {
            id,
            title: self.title,
            difficulty: self.difficulty,
            description: self.description,
            schema_script: self.schema_script,
            expected_result: self.expected_result,
            hint: self.hint,
            source_name: source_name.into(),
        }
    }
}

/// Outcome of checking one record.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordCheck {
    WellFormed(QuestionDraft),
    Malformed { reason: String },
}

impl RecordCheck {
    fn malformed(reason: impl Into<String>) -> Self {
        RecordCheck::Malformed {
            reason: reason.into(),
        }
    }

    pub fn into_result(self) -> std::result::Result<QuestionDraft, String> {
        match self {
            RecordCheck::WellFormed(draft) => Ok(draft),
            RecordCheck::Malformed { reason } => Err(reason),
        }
    }
}

/// Parse raw bytes holding exactly one question document.
pub fn check_document(bytes: &[u8]) -> RecordCheck {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => check_record(&value),
        Err(e) => RecordCheck::malformed(format!("invalid JSON: {e}")),
    }
}

/// Validate one JSON value against the question shape.
pub fn check_record(value: &Value) -> RecordCheck {
    let Some(object) = value.as_object() else {
        return RecordCheck::malformed("question record must be a JSON object");
    };

    let title = match required_string(object, "title") {
        Ok(v) => v,
        Err(reason) => return RecordCheck::malformed(reason),
    };
    let difficulty = match required_string(object, "difficulty") {
        Ok(v) => Difficulty::from(v),
        Err(reason) => return RecordCheck::malformed(reason),
    };
    let description = match required_string(object, "description") {
        Ok(v) => v,
        Err(reason) => return RecordCheck::malformed(reason),
    };
    let schema_script = match required_string(object, "schema") {
        Ok(v) => v,
        Err(reason) => return RecordCheck::malformed(reason),
    };
    let hint = match object.get("hint") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return RecordCheck::malformed("field 'hint' must be a string"),
    };
    let expected_result = match object.get("expectedResult") {
        Some(v) => match check_expected_result(v) {
            Ok(set) => set,
            Err(reason) => return RecordCheck::malformed(reason),
        },
        None => return RecordCheck::malformed("missing required field 'expectedResult'"),
    };

    if title.trim().is_empty() {
        return RecordCheck::malformed("field 'title' must not be empty");
    }
    if schema_script.trim().is_empty() {
        return RecordCheck::malformed("field 'schema' must not be empty");
    }

    RecordCheck::WellFormed(QuestionDraft {
        title,
        difficulty,
        description,
        schema_script,
        expected_result,
        hint,
    })
}

/// Parse an import document: a single question object or an array of them.
///
/// The document is accepted only when every record is well formed.
pub fn parse_import(text: &str) -> Result<Vec<QuestionDraft>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SqlboxError::Import(format!("invalid JSON: {e}")))?;

    match value {
        Value::Array(records) => {
            if records.is_empty() {
                return Err(SqlboxError::Import(
                    "document contains no questions".to_string(),
                ));
            }
            records
                .iter()
                .enumerate()
                .map(|(idx, record)| {
                    check_record(record).into_result().map_err(|reason| {
                        SqlboxError::Import(format!("question #{}: {}", idx + 1, reason))
                    })
                })
                .collect()
        }
        Value::Object(_) => check_record(&value)
            .into_result()
            .map(|draft| vec![draft])
            .map_err(SqlboxError::Import),
        _ => Err(SqlboxError::Import(
            "expected a question object or an array of question objects".to_string(),
        )),
    }
}

fn required_string(object: &Map<String, Value>, field: &str) -> std::result::Result<String, String> {
    match object.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(format!("missing required field '{field}'")),
        Some(_) => Err(format!("field '{field}' must be a string")),
    }
}

fn check_expected_result(value: &Value) -> std::result::Result<ResultSet, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "field 'expectedResult' must be an object".to_string())?;

    let columns = object
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| "expectedResult.columns must be an array".to_string())?
        .iter()
        .map(|c| {
            c.as_str()
                .map(str::to_string)
                .ok_or_else(|| "expectedResult.columns must contain only strings".to_string())
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let raw_rows = object
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| "expectedResult.values must be an array".to_string())?;

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (idx, raw_row) in raw_rows.iter().enumerate() {
        let cells = raw_row
            .as_array()
            .ok_or_else(|| format!("expectedResult.values[{idx}] must be an array"))?;
        if cells.len() != columns.len() {
            return Err(format!(
                "expectedResult.values[{idx}] has {} values but {} columns were declared",
                cells.len(),
                columns.len()
            ));
        }
        let row = cells
            .iter()
            .map(scalar_from_json)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|reason| format!("expectedResult.values[{idx}]: {reason}"))?;
        rows.push(row);
    }

    Ok(ResultSet { columns, rows })
}

fn scalar_from_json(value: &Value) -> std::result::Result<Scalar, String> {
    match value {
        Value::Null => Ok(Scalar::Null),
        // SQLite stores booleans as 0/1
        Value::Bool(b) => Ok(Scalar::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Integer(i))
            } else {
                n.as_f64()
                    .map(Scalar::Real)
                    .ok_or_else(|| format!("unsupported number {n}"))
            }
        }
        Value::String(s) => Ok(Scalar::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => {
            Err("nested arrays and objects are not valid cell values".to_string())
        }
    }
}
