// ABOUTME: Application-wide error types for trackctl.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::CredentialsError;
use crate::publish::RequestError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("no credentials configured (set `credentials` in trackctl.yml or TRACKCTL_CREDENTIALS)")]
    MissingCredentials,

    #[error("configuration error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
