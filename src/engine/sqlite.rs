use crate::config::types::{EngineError, Result, ResultSet, Scalar, SqlboxError};
use crate::engine::{Database, SqlEngine};
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};
use std::fmt::Write;

/// SQLite backend. Every database is a private `:memory:` connection.
#[derive(Debug, Clone)]
pub struct SqliteEngine {
    version: String,
}

impl SqliteEngine {
    /// Probe the bundled SQLite library once before any sandbox is opened.
    pub fn init() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SqlboxError::EngineUnavailable(e.to_string()))?;
        let version: String = conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .map_err(|e| SqlboxError::EngineUnavailable(e.to_string()))?;
        log::debug!("SQLite engine ready (version {})", version);
        Ok(Self { version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl SqlEngine for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn new_database(&self) -> Result<Box<dyn Database>> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SqlboxError::EngineUnavailable(e.to_string()))?;
        Ok(Box::new(SqliteDatabase { conn }))
    }
}

/// In-memory SQLite database backing one sandbox.
pub struct SqliteDatabase {
    conn: Connection,
}

impl Database for SqliteDatabase {
    fn exec(&mut self, sql: &str) -> std::result::Result<Vec<ResultSet>, EngineError> {
        let mut results = Vec::new();
        let mut batch = Batch::new(&self.conn, sql);

        while let Some(mut stmt) = batch.next()? {
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let width = columns.len();

            let mut rows = Vec::new();
            let mut cursor = stmt.query([])?;
            while let Some(row) = cursor.next()? {
                let mut values = Vec::with_capacity(width);
                for idx in 0..width {
                    values.push(scalar_from_ref(row.get_ref(idx)?));
                }
                rows.push(values);
            }

            results.push(ResultSet { columns, rows });
        }

        Ok(results)
    }
}

fn scalar_from_ref(value: ValueRef<'_>) -> Scalar {
    match value {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => Scalar::Integer(i),
        ValueRef::Real(f) => Scalar::Real(f),
        ValueRef::Text(bytes) => Scalar::Text(String::from_utf8_lossy(bytes).into_owned()),
        // No blob scalar; render as a SQL hex literal
        ValueRef::Blob(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2 + 3);
            hex.push_str("X'");
            for byte in bytes {
                let _ = write!(hex, "{byte:02X}");
            }
            hex.push('\'');
            Scalar::Text(hex)
        }
    }
}
