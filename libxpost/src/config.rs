//! Configuration management for Xpost
//!
//! Everything here is optional: without a config file the tool posts to the
//! public X endpoints using the v2 media upload.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::types::MediaCategory;
use crate::upload::UploadStrategy;

pub const DEFAULT_POST_ENDPOINT: &str = "https://api.x.com/2/tweets";
pub const DEFAULT_SITE_ROOT: &str = "https://x.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_MEDIA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub post_endpoint: String,
    /// Overrides the strategy's default upload endpoint
    pub upload_endpoint: Option<String>,
    pub site_root: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            post_endpoint: DEFAULT_POST_ENDPOINT.to_string(),
            upload_endpoint: None,
            site_root: DEFAULT_SITE_ROOT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub strategy: UploadStrategy,
    /// Sent as `media_category` by the v2 upload
    pub category: MediaCategory,
    /// Larger attachments are skipped without contacting the API
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            strategy: UploadStrategy::default(),
            category: MediaCategory::default(),
            max_bytes: DEFAULT_MAX_MEDIA_BYTES,
        }
    }
}

/// The three URLs a publish touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub upload: String,
    pub post: String,
    pub site_root: String,
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api.post_endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("api.post_endpoint".to_string()).into());
        }
        if self.api.site_root.trim().is_empty() {
            return Err(ConfigError::MissingField("api.site_root".to_string()).into());
        }
        if matches!(&self.api.upload_endpoint, Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::MissingField("api.upload_endpoint".to_string()).into());
        }
        // A zero duration would make every request time out immediately
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::MissingField("api.timeout_secs".to_string()).into());
        }
        Ok(())
    }

    /// Endpoints for the configured upload strategy
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            upload: self
                .api
                .upload_endpoint
                .clone()
                .unwrap_or_else(|| self.upload.strategy.default_endpoint().to_string()),
            post: self.api.post_endpoint.clone(),
            site_root: self.api.site_root.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// `XPOST_CONFIG` if set, else `<config_dir>/xpost/config.toml`
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("XPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("xpost").join("config.toml"))
}
