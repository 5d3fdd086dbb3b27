use crate::config::types::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One listed document in a question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub content_url: String,
}

impl SourceEntry {
    pub fn new(name: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_url: content_url.into(),
        }
    }
}

/// Listing + fetch contract for question repositories.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// Entries in listing order. Fails as a whole when the listing cannot be obtained.
    async fn list_entries(&self) -> Result<Vec<SourceEntry>>;

    /// Raw bytes of one entry.
    async fn fetch(&self, entry: &SourceEntry) -> Result<Vec<u8>>;
}

/// Whether `name` ends in one of `extensions` (compared case-insensitively, no leading dot).
pub fn has_document_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
