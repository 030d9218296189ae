// ABOUTME: Credential loading with SNAFU context errors.
// ABOUTME: Reads an OAuth access token from a JSON credentials file.

use serde::Deserialize;
use snafu::{ResultExt, Snafu, ensure};
use std::path::{Path, PathBuf};

/// Failure to load credentials. Always fatal at start-up.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CredentialsError {
    #[snafu(display("credentials file not found: {}", path.display()))]
    Missing { path: PathBuf },

    #[snafu(display("failed to read credentials file {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse credentials file {}: {source}", path.display()))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("credentials file {} has an empty access_token", path.display()))]
    EmptyToken { path: PathBuf },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsErrorKind {
    Missing,
    Unreadable,
    Malformed,
}

impl CredentialsError {
    pub fn kind(&self) -> CredentialsErrorKind {
        match self {
            CredentialsError::Missing { .. } => CredentialsErrorKind::Missing,
            CredentialsError::Read { .. } => CredentialsErrorKind::Unreadable,
            CredentialsError::Parse { .. } | CredentialsError::EmptyToken { .. } => {
                CredentialsErrorKind::Malformed
            }
        }
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    access_token: String,
    #[serde(default)]
    client_email: Option<String>,
}

/// Bearer credentials for the publisher API.
#[derive(Clone)]
pub struct Credentials {
    access_token: String,
    client_email: Option<String>,
}

// Never print the token.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        ensure!(
            path.is_file(),
            MissingSnafu {
                path: path.to_path_buf()
            }
        );
        let content = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        let file: CredentialsFile = serde_json::from_str(&content).context(ParseSnafu { path })?;
        ensure!(
            !file.access_token.trim().is_empty(),
            EmptyTokenSnafu { path }
        );

        tracing::debug!(
            client = file.client_email.as_deref().unwrap_or("unknown"),
            "loaded credentials"
        );
        Ok(Self {
            access_token: file.access_token.trim().to_string(),
            client_email: file.client_email,
        })
    }

    pub fn from_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            client_email: None,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn client_email(&self) -> Option<&str> {
        self.client_email.as_deref()
    }
}
