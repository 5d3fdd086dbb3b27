use crate::config::types::{Result, ResultSet, SqlboxError};
/// Query execution against the active sandbox
use crate::exec::sandbox::Sandbox;
use log::debug;

/// Runs learner queries. Stateless; all state lives in the sandbox.
pub struct ExecutionService;

impl ExecutionService {
    /// Execute `query` and return one result set per statement.
    ///
    /// A blank query is rejected before the database is touched. Engine
    /// diagnostics are returned verbatim.
    pub fn run(sandbox: &mut Sandbox, query: &str) -> Result<Vec<ResultSet>> {
        Self::validate_query(query)?;

        debug!(
            "Executing query in sandbox {} ({} bytes)",
            sandbox.sandbox_id(),
            query.len()
        );
        sandbox
            .db_mut()
            .exec(query)
            .map_err(|e| SqlboxError::Execution(e.0))
    }

    /// Reject queries that are empty after trimming whitespace.
    pub fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(SqlboxError::Validation("empty query".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets::fallback_questions;
    use crate::config::types::Scalar;
    use crate::exec::sandbox::SandboxManager;
    use crate::testing::StubEngine;
    use std::sync::Arc;

    fn provisioned(stub: StubEngine) -> SandboxManager {
        let question = fallback_questions().remove(0);
        let stub = stub.respond(&question.schema_script, vec![ResultSet::empty()]);
        let mut manager = SandboxManager::new(Arc::new(stub));
        manager.provision(&question).unwrap();
        manager
    }

    #[test]
    fn test_blank_query_never_reaches_engine() {
        let stub = StubEngine::new();
        let mut manager = provisioned(stub.clone());
        let sandbox = manager.active_mut().unwrap();

        for query in ["", "   ", "\n\t "] {
            let err = ExecutionService::run(sandbox, query).unwrap_err();
            assert!(matches!(err, SqlboxError::Validation(_)));
        }
        // Only the schema script was executed
        assert_eq!(stub.calls().len(), 1);
    }

    #[test]
    fn test_engine_diagnostic_is_verbatim() {
        let stub = StubEngine::new().fail("SELEC * FROM employees", "near \"SELEC\": syntax error");
        let mut manager = provisioned(stub);
        let err = ExecutionService::run(manager.active_mut().unwrap(), "SELEC * FROM employees")
            .unwrap_err();
        assert_eq!(err.to_string(), "near \"SELEC\": syntax error");
    }

    #[test]
    fn test_returns_engine_results() {
        let expected = ResultSet::new(vec!["n".to_string()], vec![vec![Scalar::Integer(7)]]).unwrap();
        let stub = StubEngine::new().respond("SELECT 7 AS n", vec![expected.clone()]);
        let mut manager = provisioned(stub);
        let results = ExecutionService::run(manager.active_mut().unwrap(), "SELECT 7 AS n").unwrap();
        assert_eq!(results, vec![expected]);
    }
}
