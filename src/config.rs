use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL all backend requests are issued against.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Content types accepted by the upload pipeline. Anything else is
    /// filtered out before any network call.
    #[serde(default = "default_accepted_types")]
    pub accepted_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_types: default_accepted_types(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_accepted_types() -> Vec<String> {
    vec!["application/pdf".to_string()]
}

fn default_history_path() -> PathBuf {
    PathBuf::from(format!("./data/{}.json", crate::history::STORAGE_KEY))
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate backend
    if config.backend.base_url.is_empty() {
        anyhow::bail!("backend.base_url must not be empty");
    }

    if !config.backend.base_url.starts_with("http://")
        && !config.backend.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "backend.base_url must start with http:// or https://, got '{}'",
            config.backend.base_url
        );
    }

    if config.backend.timeout_secs == 0 {
        anyhow::bail!("backend.timeout_secs must be > 0");
    }

    // Validate upload
    if config.upload.accepted_types.is_empty() {
        anyhow::bail!("upload.accepted_types must not be empty");
    }

    Ok(config)
}
