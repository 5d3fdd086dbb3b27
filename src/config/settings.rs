/// Configuration loading from sqlbox.json
use crate::config::types::{Result, SqlboxError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "sqlbox.json";

/// Environment variable overriding `source.repo`
pub const REPO_ENV_VAR: &str = "SQLBOX_REPO";

/// Remote question repository settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Contents API base URL
    pub api_base: String,
    /// Repository in `owner/name` form
    pub repo: String,
    /// Folder within the repository holding question documents
    pub folder: String,
    /// Recognized document extensions, without the leading dot
    pub extensions: Vec<String>,
    /// User-Agent sent with every request (the contents API rejects anonymous agents)
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            repo: "YOUR_USERNAME/YOUR_REPO_NAME".to_string(),
            folder: "questions".to_string(),
            extensions: vec!["json".to_string()],
            user_agent: format!("sqlbox/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SourceConfig {
    /// Directory listing URL for the configured folder
    pub fn listing_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            self.repo,
            self.folder.trim_matches('/')
        )
    }
}

/// Full sqlbox.json structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlboxConfig {
    pub source: SourceConfig,
    /// Local folder of question documents used instead of the remote source
    pub questions_dir: Option<PathBuf>,
    /// Skip every source and serve the built-in set
    pub offline: bool,
}

impl SqlboxConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SqlboxError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let mut config: SqlboxConfig = serde_json::from_str(&config_content)
            .map_err(|e| SqlboxError::Config(format!("Failed to parse config JSON: {}", e)))?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load ./sqlbox.json when present, defaults otherwise
    pub fn load_default() -> Result<Self> {
        let config_path = std::env::current_dir()
            .map_err(|e| SqlboxError::Config(format!("Failed to get current directory: {}", e)))?
            .join(DEFAULT_CONFIG_FILE);

        if !config_path.exists() {
            log::debug!("{} not found, using built-in defaults", DEFAULT_CONFIG_FILE);
            let mut config = Self::default();
            config.apply_env_overrides();
            return Ok(config);
        }

        Self::load_from_file(config_path)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(repo) = std::env::var(REPO_ENV_VAR) {
            if !repo.trim().is_empty() {
                log::info!("Using question repository {} from {}", repo, REPO_ENV_VAR);
                self.source.repo = repo;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.extensions.is_empty() {
            return Err(SqlboxError::Config(
                "source.extensions must list at least one extension".to_string(),
            ));
        }
        if !self.source.repo.contains('/') {
            return Err(SqlboxError::Config(format!(
                "source.repo must look like owner/name, got '{}'",
                self.source.repo
            )));
        }
        Ok(())
    }
}
