//! Scripted in-memory engine.
//!
//! Lets the sandbox, executor and session be exercised without SQLite.
//! Responses are keyed by the trimmed SQL text; anything unscripted fails
//! the way an empty database would. Every call is recorded.

use crate::config::types::{EngineError, Result, ResultSet};
use crate::engine::{Database, SqlEngine};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct StubState {
    responses: HashMap<String, std::result::Result<Vec<ResultSet>, String>>,
    calls: Vec<String>,
    databases_opened: usize,
}

/// Engine whose databases answer from a shared script.
#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    state: Arc<Mutex<StubState>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful response for `sql`.
    pub fn respond(self, sql: &str, results: Vec<ResultSet>) -> Self {
        self.lock()
            .responses
            .insert(sql.trim().to_string(), Ok(results));
        self
    }

    /// Script a failure for `sql`.
    pub fn fail(self, sql: &str, message: &str) -> Self {
        self.lock()
            .responses
            .insert(sql.trim().to_string(), Err(message.to_string()));
        self
    }

    /// Every SQL text executed so far, across all databases.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn databases_opened(&self) -> usize {
        self.lock().databases_opened
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        // A poisoned script only means a test already panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SqlEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn new_database(&self) -> Result<Box<dyn Database>> {
        self.lock().databases_opened += 1;
        Ok(Box::new(StubDatabase {
            engine: self.clone(),
        }))
    }
}

struct StubDatabase {
    engine: StubEngine,
}

impl Database for StubDatabase {
    fn exec(&mut self, sql: &str) -> std::result::Result<Vec<ResultSet>, EngineError> {
        let key = sql.trim().to_string();
        let mut state = self.engine.lock();
        state.calls.push(key.clone());
        match state.responses.get(&key) {
            Some(Ok(results)) => Ok(results.clone()),
            Some(Err(message)) => Err(EngineError(message.clone())),
            None => Err(EngineError(format!("no such table: unscripted statement '{key}'"))),
        }
    }
}
