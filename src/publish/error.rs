// ABOUTME: Error types for publishing operations.
// ABOUTME: Separates local resource failures from remote gateway failures.

use std::path::PathBuf;

use crate::gateway::GatewayError;

/// Errors raised while carrying out a publishing operation.
///
/// Public operations never return these directly; they fold them into
/// `OperationResult` or `DeploymentResult` values.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A local file (artifact, image, CSV, payload) does not exist.
    #[error("file not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// The requested version code is absent from the source track.
    #[error("version code {version_code} not found in track '{track}'")]
    VersionNotFound { track: String, version_code: i64 },

    /// A local file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("remote call failed: {0}")]
    Gateway(#[from] GatewayError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishErrorKind {
    ResourceNotFound,
    NotFound,
    LocalIo,
    InvalidPayload,
    Gateway,
}

impl PublishError {
    pub fn kind(&self) -> PublishErrorKind {
        match self {
            PublishError::ResourceNotFound(_) => PublishErrorKind::ResourceNotFound,
            PublishError::VersionNotFound { .. } => PublishErrorKind::NotFound,
            PublishError::Read { .. } => PublishErrorKind::LocalIo,
            PublishError::InvalidPayload(_) => PublishErrorKind::InvalidPayload,
            PublishError::Gateway(_) => PublishErrorKind::Gateway,
        }
    }

    /// The underlying gateway failure, if the error came from the remote API.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            PublishError::Gateway(e) => Some(e),
            _ => None,
        }
    }
}
