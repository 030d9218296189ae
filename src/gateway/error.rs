// ABOUTME: Error type for every call made against the publisher API.
// ABOUTME: Keeps the HTTP status and structured detail list of remote rejections.

use serde::Deserialize;
use std::time::Duration;

/// One entry of the structured `errors` list a remote rejection carries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
            domain: None,
        }
    }
}

/// Failure from the remote release-management API.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The API answered with a non-success status.
    #[error("{operation} rejected with HTTP {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
        details: Vec<ErrorDetail>,
    },

    /// The request never produced a response.
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {operation} request: {reason}")]
    InvalidRequest { operation: String, reason: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Api,
    Transport,
    Timeout,
    Decode,
    InvalidRequest,
}

impl GatewayError {
    pub fn api(
        operation: impl Into<String>,
        status: u16,
        message: impl Into<String>,
        details: Vec<ErrorDetail>,
    ) -> Self {
        GatewayError::Api {
            operation: operation.into(),
            status,
            message: message.into(),
            details,
        }
    }

    pub fn transport(
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        GatewayError::Transport {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::Api { .. } => GatewayErrorKind::Api,
            GatewayError::Transport { .. } => GatewayErrorKind::Transport,
            GatewayError::Timeout { .. } => GatewayErrorKind::Timeout,
            GatewayError::Decode { .. } => GatewayErrorKind::Decode,
            GatewayError::InvalidRequest { .. } => GatewayErrorKind::InvalidRequest,
        }
    }

    /// HTTP status of an API rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured details of an API rejection (empty for other kinds).
    pub fn details(&self) -> &[ErrorDetail] {
        match self {
            GatewayError::Api { details, .. } => details,
            _ => &[],
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = GatewayError::api("edits.commit", 400, "Bad request", vec![]);
        assert_eq!(
            err.to_string(),
            "edits.commit rejected with HTTP 400: Bad request"
        );
        assert_eq!(err.kind(), GatewayErrorKind::Api);
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn transport_error_exposes_source() {
        let err = GatewayError::transport("edits.insert", std::io::Error::other("reset by peer"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("reset by peer"));
        assert!(err.details().is_empty());
    }
}
