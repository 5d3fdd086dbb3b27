/// Practice session state machine
///
/// The session is an explicit state value driven by discrete events:
///
/// ```text
/// Unloaded --reload--> QuestionsReady | SandboxReady
/// *        --select--> QuestionsReady (schema error) | SandboxReady
/// *        --import--> QuestionsReady (schema error) | SandboxReady
/// SandboxReady | Run* --submit--> RunSucceeded | RunFailed
/// ```
///
/// Every list change or selection change provisions exactly one fresh
/// sandbox. Selecting the question the active sandbox already serves is a
/// no-op. Validation failures and missing sandboxes are reported to the
/// caller without touching the state.
use crate::catalog::aggregator::QuestionAggregator;
use crate::config::types::{Question, Result, ResultSet, SqlboxError};
use crate::engine::SqlEngine;
use crate::exec::executor::ExecutionService;
use crate::exec::sandbox::SandboxManager;
use crate::observability::metrics::get_metrics;
use crate::verdict::{primary_result, Verdict, VerdictClassifier};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a successful run produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunOutcome {
    /// One result set per executed statement
    pub results: Vec<ResultSet>,
    /// The result shown to the learner and judged: the first tabular set
    pub displayed: ResultSet,
    pub verdict: Verdict,
    #[serde(skip)]
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// No question list yet
    Unloaded,
    /// A question is selected but its schema failed to load
    QuestionsReady { selected: usize, schema_error: String },
    SandboxReady { selected: usize },
    RunSucceeded { selected: usize, outcome: RunOutcome },
    /// The last query failed; earlier results are gone
    RunFailed { selected: usize, error: String },
}

impl SessionState {
    pub fn selected(&self) -> Option<usize> {
        match self {
            SessionState::Unloaded => None,
            SessionState::QuestionsReady { selected, .. }
            | SessionState::SandboxReady { selected }
            | SessionState::RunSucceeded { selected, .. }
            | SessionState::RunFailed { selected, .. } => Some(*selected),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unloaded => "unloaded",
            SessionState::QuestionsReady { .. } => "questions_ready",
            SessionState::SandboxReady { .. } => "sandbox_ready",
            SessionState::RunSucceeded { .. } => "run_succeeded",
            SessionState::RunFailed { .. } => "run_failed",
        }
    }
}

pub struct Session {
    aggregator: QuestionAggregator,
    sandboxes: SandboxManager,
    state: SessionState,
    /// Aggregator generation the active sandbox was provisioned under
    provisioned_generation: Option<u64>,
}

impl Session {
    pub fn new(aggregator: QuestionAggregator, engine: Arc<dyn SqlEngine>) -> Self {
        Self {
            aggregator,
            sandboxes: SandboxManager::new(engine),
            state: SessionState::Unloaded,
            provisioned_generation: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        self.aggregator.questions()
    }

    pub fn aggregator(&self) -> &QuestionAggregator {
        &self.aggregator
    }

    pub fn sandboxes(&self) -> &SandboxManager {
        &self.sandboxes
    }

    pub fn selected_question(&self) -> Option<&Question> {
        self.state
            .selected()
            .and_then(|index| self.aggregator.get(index))
    }

    /// Replace the question list and provision the selected question.
    ///
    /// The previous selection is kept when it is still in range, otherwise
    /// the first question is selected.
    pub async fn reload(&mut self) -> &SessionState {
        // Release before the load so no sandbox outlives the list it came from
        self.sandboxes.dispose();
        let previous = self.state.selected();
        let count = self.aggregator.load_questions().await.len();

        let selected = match previous {
            Some(index) if index < count => index,
            _ => 0,
        };
        if count == 0 {
            self.state = SessionState::Unloaded;
        } else {
            self.provision_selected(selected);
        }
        &self.state
    }

    /// Append questions from a document. A rejected document changes nothing.
    pub fn import(&mut self, document_text: &str, source_name: &str) -> Result<Vec<Question>> {
        let imported = self.aggregator.import_named(document_text, source_name)?;
        let selected = self.state.selected().unwrap_or(0);
        self.provision_selected(selected);
        Ok(imported)
    }

    /// Select the question at `index` and provision a fresh sandbox for it.
    ///
    /// Re-selecting the question the active sandbox was built for keeps that
    /// sandbox and the current state.
    pub fn select(&mut self, index: usize) -> Result<&SessionState> {
        if index >= self.aggregator.len() {
            return Err(SqlboxError::Validation(format!(
                "question index {} out of range ({} question(s) loaded)",
                index,
                self.aggregator.len()
            )));
        }
        if self.serves(index) {
            return Ok(&self.state);
        }
        self.provision_selected(index);
        Ok(&self.state)
    }

    /// Run a learner query against the active sandbox and judge it.
    pub fn submit(&mut self, query: &str) -> Result<RunOutcome> {
        let metrics = get_metrics();
        if let Err(e) = ExecutionService::validate_query(query) {
            metrics.validation_errors.inc();
            return Err(e);
        }

        let (Some(selected), Some(sandbox)) = (self.state.selected(), self.sandboxes.active_mut())
        else {
            return Err(SqlboxError::NoSandbox);
        };
        let question = self
            .aggregator
            .get(selected)
            .ok_or(SqlboxError::NoSandbox)?;

        let started = Instant::now();
        let results = match ExecutionService::run(sandbox, query) {
            Ok(results) => results,
            Err(e) => {
                metrics.execution_errors.inc();
                warn!("Query failed on question {}: {}", question.id, e);
                self.state = SessionState::RunFailed {
                    selected,
                    error: e.to_string(),
                };
                return Err(e);
            }
        };

        let primary = primary_result(&results);
        let verdict = VerdictClassifier::judge(primary, &question.expected_result);
        let displayed = primary.cloned().unwrap_or_else(ResultSet::empty);
        let elapsed = started.elapsed();
        metrics.record_verdict(verdict.cause, elapsed);
        info!(
            "Question {} judged {} ({})",
            question.id,
            if verdict.correct { "correct" } else { "incorrect" },
            verdict.cause.as_str()
        );

        let outcome = RunOutcome {
            results,
            displayed,
            verdict,
            elapsed,
        };
        self.state = SessionState::RunSucceeded {
            selected,
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    /// Whether the active sandbox was built from the question at `index` of
    /// the current list.
    fn serves(&self, index: usize) -> bool {
        let (Some(sandbox), Some(question)) = (self.sandboxes.active(), self.aggregator.get(index))
        else {
            return false;
        };
        self.state.selected() == Some(index)
            && self.provisioned_generation == Some(self.aggregator.generation())
            && sandbox.question_id() == question.id
            && sandbox.fingerprint() == question.fingerprint()
    }

    fn provision_selected(&mut self, selected: usize) {
        let Some(question) = self.aggregator.get(selected) else {
            self.sandboxes.dispose();
            self.provisioned_generation = None;
            self.state = SessionState::Unloaded;
            return;
        };
        self.provisioned_generation = Some(self.aggregator.generation());

        self.state = match self.sandboxes.provision(question) {
            Ok(_) => SessionState::SandboxReady { selected },
            Err(e) => SessionState::QuestionsReady {
                selected,
                schema_error: e.to_string(),
            },
        };
    }
}
