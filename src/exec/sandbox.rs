/// Per-exercise sandbox lifecycle
///
/// At most one sandbox exists at a time. Provisioning always starts from a
/// brand-new database, so nothing a learner did to an earlier sandbox can
/// leak into the next one. The old sandbox is released before the new one
/// is created.
use crate::config::types::{Question, Result, SqlboxError};
use crate::engine::{Database, SqlEngine};
use crate::observability::metrics::get_metrics;
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// An isolated database seeded with one question's schema.
pub struct Sandbox {
    sandbox_id: String,
    question_id: u32,
    /// Fingerprint of the question the schema came from
    fingerprint: String,
    db: Box<dyn Database>,
}

impl Sandbox {
    pub fn sandbox_id(&self) -> &str {
        &self.sandbox_id
    }

    pub fn question_id(&self) -> u32 {
        self.question_id
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub(crate) fn db_mut(&mut self) -> &mut dyn Database {
        self.db.as_mut()
    }
}

impl std::fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sandbox")
            .field("sandbox_id", &self.sandbox_id)
            .field("question_id", &self.question_id)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Owner of the single active sandbox.
pub struct SandboxManager {
    engine: Arc<dyn SqlEngine>,
    active: Option<Sandbox>,
}

impl SandboxManager {
    pub fn new(engine: Arc<dyn SqlEngine>) -> Self {
        Self {
            engine,
            active: None,
        }
    }

    /// Replace the active sandbox with a fresh one seeded from `question`.
    ///
    /// On schema failure no sandbox is left active.
    pub fn provision(&mut self, question: &Question) -> Result<&mut Sandbox> {
        self.dispose();

        let mut db = self.engine.new_database()?;
        if let Err(e) = db.exec(&question.schema_script) {
            get_metrics().schema_failures.inc();
            warn!(
                "Error loading schema for question {}: {}",
                question.id, e
            );
            return Err(SqlboxError::Schema {
                question_id: question.id,
                message: e.to_string(),
            });
        }

        let sandbox = Sandbox {
            sandbox_id: Uuid::new_v4().to_string(),
            question_id: question.id,
            fingerprint: question.fingerprint(),
            db,
        };
        get_metrics().sandboxes_provisioned.inc();
        info!(
            "Provisioned {} sandbox {} for question {}",
            self.engine.name(),
            sandbox.sandbox_id,
            question.id
        );

        Ok(self.active.insert(sandbox))
    }

    pub fn active(&self) -> Option<&Sandbox> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Sandbox> {
        self.active.as_mut()
    }

    /// Release the active sandbox, if any. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(old) = self.active.take() {
            debug!("Released sandbox {}", old.sandbox_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets::fallback_questions;
    use crate::config::types::ResultSet;
    use crate::testing::StubEngine;

    fn question_with_schema(schema: &str) -> Question {
        let mut q = fallback_questions().remove(0);
        q.schema_script = schema.to_string();
        q
    }

    #[test]
    fn test_provision_runs_schema_on_fresh_database() {
        let stub = StubEngine::new().respond("CREATE TABLE t (x INTEGER);", vec![ResultSet::empty()]);
        let mut manager = SandboxManager::new(Arc::new(stub.clone()));
        let question = question_with_schema("CREATE TABLE t (x INTEGER);");

        let sandbox = manager.provision(&question).unwrap();
        assert_eq!(sandbox.question_id(), question.id);
        assert_eq!(sandbox.fingerprint(), question.fingerprint());

        assert_eq!(stub.databases_opened(), 1);
        assert_eq!(stub.calls(), vec!["CREATE TABLE t (x INTEGER);".to_string()]);
    }

    #[test]
    fn test_reprovision_replaces_sandbox() {
        let stub = StubEngine::new().respond("CREATE TABLE t (x INTEGER);", vec![ResultSet::empty()]);
        let mut manager = SandboxManager::new(Arc::new(stub.clone()));
        let question = question_with_schema("CREATE TABLE t (x INTEGER);");

        let first = manager.provision(&question).unwrap().sandbox_id().to_string();
        let second = manager.provision(&question).unwrap().sandbox_id().to_string();

        assert_ne!(first, second);
        assert_eq!(stub.databases_opened(), 2);
    }

    #[test]
    fn test_schema_failure_leaves_no_sandbox() {
        let stub = StubEngine::new()
            .respond("CREATE TABLE t (x INTEGER);", vec![ResultSet::empty()])
            .fail("CREATE TABEL broken", "near \"TABEL\": syntax error");
        let mut manager = SandboxManager::new(Arc::new(stub));

        manager
            .provision(&question_with_schema("CREATE TABLE t (x INTEGER);"))
            .unwrap();
        let err = manager
            .provision(&question_with_schema("CREATE TABEL broken"))
            .unwrap_err();

        match err {
            SqlboxError::Schema { message, .. } => assert!(message.contains("syntax error")),
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(manager.active().is_none());
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let stub = StubEngine::new().respond("CREATE TABLE t (x INTEGER);", vec![ResultSet::empty()]);
        let mut manager = SandboxManager::new(Arc::new(stub));
        manager
            .provision(&question_with_schema("CREATE TABLE t (x INTEGER);"))
            .unwrap();
        manager.dispose();
        manager.dispose();
        assert!(manager.active().is_none());
    }
}
