//! Question source backed by a local folder of documents.

use crate::catalog::source::{QuestionSource, SourceEntry};
use crate::config::types::{Result, SqlboxError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Lists regular files in one directory, sorted by file name.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl QuestionSource for DirectorySource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn list_entries(&self) -> Result<Vec<SourceEntry>> {
        let mut reader = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            SqlboxError::Load(format!("cannot list {}: {}", self.dir.display(), e))
        })?;

        let mut entries = Vec::new();
        while let Some(item) = reader
            .next_entry()
            .await
            .map_err(|e| SqlboxError::Load(format!("cannot list {}: {}", self.dir.display(), e)))?
        {
            let is_file = item
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            let name = item.file_name().to_string_lossy().into_owned();
            entries.push(SourceEntry::new(name, item.path().to_string_lossy().into_owned()));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn fetch(&self, entry: &SourceEntry) -> Result<Vec<u8>> {
        tokio::fs::read(&entry.content_url)
            .await
            .map_err(|e| SqlboxError::Load(format!("cannot read {}: {}", entry.content_url, e)))
    }
}
