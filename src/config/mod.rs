// ABOUTME: Configuration types and parsing for trackctl.yml.
// ABOUTME: Handles YAML discovery, defaults, and environment overrides.

mod api;
mod credentials;
mod init;

pub use api::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_UPLOAD_BASE_URL};
pub use credentials::{Credentials, CredentialsError, CredentialsErrorKind};
pub use init::init_config;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "trackctl.yml";
pub const CONFIG_FILENAME_ALT: &str = "trackctl.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".trackctl/config.yml";

/// Overrides the credentials path from the config file.
pub const ENV_CREDENTIALS: &str = "TRACKCTL_CREDENTIALS";
/// Overrides `api.base_url` from the config file.
pub const ENV_API_BASE_URL: &str = "TRACKCTL_API_BASE_URL";

/// Language used for release notes and listings when none is given.
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the credentials JSON file.
    #[serde(default)]
    pub credentials: Option<PathBuf>,

    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default)]
    pub api: ApiConfig,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            credentials: None,
            default_language: default_language(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like `discover`, but a directory without a config file yields the defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply `TRACKCTL_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(ENV_CREDENTIALS).filter(|v| !v.is_empty()) {
            self.credentials = Some(PathBuf::from(path));
        }
        if let Some(url) = std::env::var(ENV_API_BASE_URL)
            .ok()
            .filter(|url| !url.trim().is_empty())
        {
            self.api.base_url = url.trim().to_string();
        }
        self
    }

    /// Load the configured credentials. Missing configuration is fatal.
    pub fn load_credentials(&self) -> Result<Credentials> {
        let path = self
            .credentials
            .as_deref()
            .ok_or(Error::MissingCredentials)?;
        Ok(Credentials::load(path)?)
    }

    fn validate(&self) -> Result<()> {
        if self.default_language.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "default_language cannot be empty".to_string(),
            ));
        }
        self.api.validate()
    }

    pub fn template() -> Self {
        Config {
            credentials: Some(PathBuf::from("credentials.json")),
            ..Config::default()
        }
    }
}
