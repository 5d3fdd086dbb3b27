//! Question source backed by a repository contents listing over HTTP.

use crate::catalog::source::{QuestionSource, SourceEntry};
use crate::config::settings::SourceConfig;
use crate::config::types::{Result, SqlboxError};
use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use serde::Deserialize;

/// One item of a contents listing. Directories carry no download URL.
#[derive(Debug, Deserialize)]
struct ContentsItem {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    download_url: Option<String>,
}

impl ContentsItem {
    fn into_entry(self) -> Option<SourceEntry> {
        if matches!(self.kind.as_deref(), Some(kind) if kind != "file") {
            return None;
        }
        let url = self.download_url?;
        Some(SourceEntry::new(self.name, url))
    }
}

/// Lists `{api_base}/repos/{repo}/contents/{folder}` and downloads entries.
#[derive(Clone)]
pub struct GithubSource {
    http_client: reqwest::Client,
    listing_url: String,
}

impl GithubSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SqlboxError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            listing_url: config.listing_url(),
        })
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }
}

fn parse_listing(body: &[u8]) -> Result<Vec<SourceEntry>> {
    let items: Vec<ContentsItem> = serde_json::from_slice(body)
        .map_err(|e| SqlboxError::Load(format!("listing is not a contents array: {}", e)))?;
    Ok(items.into_iter().filter_map(ContentsItem::into_entry).collect())
}

#[async_trait]
impl QuestionSource for GithubSource {
    fn describe(&self) -> String {
        self.listing_url.clone()
    }

    async fn list_entries(&self) -> Result<Vec<SourceEntry>> {
        debug!("[SOURCE] GET {}", self.listing_url);
        let response = self
            .http_client
            .get(&self.listing_url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| SqlboxError::Load(format!("listing request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SqlboxError::Load(format!(
                "listing {} returned HTTP {}",
                self.listing_url, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SqlboxError::Load(format!("failed to read listing body: {}", e)))?;
        parse_listing(&body)
    }

    async fn fetch(&self, entry: &SourceEntry) -> Result<Vec<u8>> {
        debug!("[SOURCE] GET {}", entry.content_url);
        let response = self
            .http_client
            .get(&entry.content_url)
            .send()
            .await
            .map_err(|e| SqlboxError::Load(format!("fetch of {} failed: {}", entry.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SqlboxError::Load(format!(
                "fetch of {} returned HTTP {}",
                entry.name, status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SqlboxError::Load(format!("failed to read {}: {}", entry.name, e)))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_keeps_files_in_order() {
        let body = br#"[
            {"name": "b.json", "type": "file", "download_url": "https://raw.example/b.json"},
            {"name": "drafts", "type": "dir", "download_url": null},
            {"name": "a.json", "type": "file", "download_url": "https://raw.example/a.json"},
            {"name": "README.md", "download_url": "https://raw.example/README.md"}
        ]"#;
        let entries = parse_listing(body).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.json", "a.json", "README.md"]);
        assert_eq!(entries[0].content_url, "https://raw.example/b.json");
    }

    #[test]
    fn test_parse_listing_rejects_error_objects() {
        let body = br#"{"message": "Not Found"}"#;
        assert!(matches!(parse_listing(body), Err(SqlboxError::Load(_))));
    }

    #[test]
    fn test_listing_url_from_config() {
        let config = SourceConfig {
            repo: "octo/sql".to_string(),
            ..SourceConfig::default()
        };
        let source = GithubSource::new(&config).unwrap();
        assert_eq!(
            source.listing_url(),
            "https://api.github.com/repos/octo/sql/contents/questions"
        );
    }
}
