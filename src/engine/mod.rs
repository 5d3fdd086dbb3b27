//! Embedded SQL engine seam.
//!
//! The sandbox manager and executor only ever talk to these traits. The
//! production backend is SQLite through rusqlite; tests can swap in the
//! scripted engine from [`crate::testing::stub_engine`].

pub mod sqlite;

use crate::config::types::{EngineError, Result, ResultSet};

/// Factory for isolated databases.
pub trait SqlEngine: Send + Sync {
    /// Backend name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Open a brand-new, empty, in-memory database sharing nothing with earlier ones.
    fn new_database(&self) -> Result<Box<dyn Database>>;
}

/// One isolated database instance.
pub trait Database: Send {
    /// Execute one or more statements, returning one result set per statement.
    ///
    /// Statements without tabular output yield an empty-columns result set.
    /// The first failing statement aborts the call with the engine's diagnostic.
    fn exec(&mut self, sql: &str) -> std::result::Result<Vec<ResultSet>, EngineError>;
}
