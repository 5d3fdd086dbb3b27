/// Question aggregation
///
/// Builds the ordered exercise list from a question source, falling back to
/// the built-in set whenever the source yields nothing usable. Loading never
/// fails; a bad entry is logged and skipped, a failed listing or an empty
/// harvest discards everything and serves the fallback set.
use crate::catalog::source::{has_document_extension, QuestionSource};
use crate::config::presets::fallback_questions;
use crate::config::types::{Question, Result};
use crate::config::validator::{check_document, parse_import, RecordCheck};
use crate::observability::metrics::get_metrics;
use log::{info, warn};

/// Source name recorded on imported questions when the caller gives none.
pub const LOCAL_IMPORT_SOURCE: &str = "local-import";

/// Where the current question list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrigin {
    Unloaded,
    Source,
    Fallback,
}

/// Owner of the in-memory question list.
pub struct QuestionAggregator {
    source: Option<Box<dyn QuestionSource>>,
    extensions: Vec<String>,
    questions: Vec<Question>,
    origin: ListOrigin,
    /// Bumped on every list replacement or append
    generation: u64,
}

impl QuestionAggregator {
    pub fn new(source: Box<dyn QuestionSource>, extensions: Vec<String>) -> Self {
        Self {
            source: Some(source),
            extensions,
            questions: Vec::new(),
            origin: ListOrigin::Unloaded,
            generation: 0,
        }
    }

    /// Aggregator with no source; every load serves the fallback set.
    pub fn offline() -> Self {
        Self {
            source: None,
            extensions: Vec::new(),
            questions: Vec::new(),
            origin: ListOrigin::Unloaded,
            generation: 0,
        }
    }

    /// Replace the list with a fresh harvest from the source (or the fallback set).
    pub async fn load_questions(&mut self) -> &[Question] {
        let metrics = get_metrics();
        metrics.loads_total.inc();

        let harvested = match &self.source {
            Some(source) => aggregate(source.as_ref(), &self.extensions).await,
            None => None,
        };

        match harvested {
            Some(questions) => {
                info!("Loaded {} question(s)", questions.len());
                self.questions = questions;
                self.origin = ListOrigin::Source;
            }
            None => {
                metrics.loads_fallback.inc();
                info!("Using built-in sample questions");
                self.questions = fallback_questions();
                self.origin = ListOrigin::Fallback;
            }
        }

        self.generation += 1;
        metrics.questions_loaded.set(self.questions.len() as u64);
        &self.questions
    }

    /// Append questions from a local document, labelled as a local import.
    pub fn import_local(&mut self, document_text: &str) -> Result<Vec<Question>> {
        self.import_named(document_text, LOCAL_IMPORT_SOURCE)
    }

    /// Append questions from a document (single object or array).
    ///
    /// All records must validate; otherwise nothing is appended.
    pub fn import_named(&mut self, document_text: &str, source_name: &str) -> Result<Vec<Question>> {
        let metrics = get_metrics();
        let drafts = match parse_import(document_text) {
            Ok(drafts) => drafts,
            Err(e) => {
                metrics.imports_rejected.inc();
                warn!("Rejected import from {}: {}", source_name, e);
                return Err(e);
            }
        };

        let mut next_id = self.max_id() + 1;
        let imported: Vec<Question> = drafts
            .into_iter()
            .map(|draft| {
                let question = draft.into_question(next_id, source_name);
                next_id += 1;
                question
            })
            .collect();

        self.questions.extend(imported.iter().cloned());
        self.generation += 1;
        metrics.imports_accepted.inc();
        metrics.questions_loaded.set(self.questions.len() as u64);
        info!(
            "Imported {} question(s) from {}",
            imported.len(),
            source_name
        );
        Ok(imported)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Position of the question carrying `id`.
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn origin(&self) -> ListOrigin {
        self.origin
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn max_id(&self) -> u32 {
        self.questions.iter().map(|q| q.id).max().unwrap_or(0)
    }
}

/// Harvest every recognized, well-formed entry in listing order.
///
/// Returns `None` when the listing fails or nothing parses, so the caller
/// can fall back.
pub async fn aggregate(source: &dyn QuestionSource, extensions: &[String]) -> Option<Vec<Question>> {
    let metrics = get_metrics();
    let entries = match source.list_entries().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error loading questions from {}: {}", source.describe(), e);
            return None;
        }
    };

    let mut questions = Vec::new();
    for entry in entries
        .iter()
        .filter(|e| has_document_extension(&e.name, extensions))
    {
        let bytes = match source.fetch(entry).await {
            Ok(bytes) => bytes,
            Err(e) => {
                metrics.entries_skipped.inc();
                warn!("Error loading {}: {}", entry.name, e);
                continue;
            }
        };

        match check_document(&bytes) {
            RecordCheck::WellFormed(draft) => {
                let id = questions.len() as u32 + 1;
                questions.push(draft.into_question(id, entry.name.clone()));
            }
            RecordCheck::Malformed { reason } => {
                metrics.entries_skipped.inc();
                warn!("Skipping malformed question {}: {}", entry.name, reason);
            }
        }
    }

    if questions.is_empty() {
        warn!(
            "No usable questions found at {}",
            source.describe()
        );
        return None;
    }
    Some(questions)
}
