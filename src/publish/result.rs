// ABOUTME: Structured outcomes returned by every publishing operation.
// ABOUTME: Failures are values here, never errors.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::gateway::{LocalizedText, Release, ReleaseStatus, Track};
use crate::types::EditId;

use super::PublishError;

/// Outcome of a mutation or query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    details: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl OperationResult {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: BTreeMap::new(),
            error: None,
        }
    }

    /// Failure result. `error` carries the remote error text, and is only
    /// set when the failure came from the gateway.
    pub fn failed(message: impl Into<String>, cause: &PublishError) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: BTreeMap::new(),
            error: cause.gateway_error().map(ToString::to_string),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
        self.details.get(key)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Outcome of deploy and promote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub success: bool,
    /// Committed edit ID; only present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<EditId>,
    pub package_name: String,
    pub track: String,
    pub version_code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeploymentResult {
    pub(crate) fn succeeded(
        edit_id: EditId,
        package_name: &str,
        track: &str,
        version_code: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            deployment_id: Some(edit_id),
            package_name: package_name.to_string(),
            track: track.to_string(),
            version_code,
            message: message.into(),
            error: None,
        }
    }

    pub(crate) fn failed(
        package_name: &str,
        track: &str,
        version_code: i64,
        message: impl Into<String>,
        cause: &PublishError,
    ) -> Self {
        Self {
            success: false,
            deployment_id: None,
            package_name: package_name.to_string(),
            track: track.to_string(),
            version_code,
            message: message.into(),
            error: cause.gateway_error().map(ToString::to_string),
        }
    }
}

/// One release flattened out of its track, for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    pub track: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub version_codes: Vec<i64>,
    pub status: ReleaseStatus,
    #[serde(rename = "userFraction", skip_serializing_if = "Option::is_none")]
    pub rollout_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub release_notes: Vec<LocalizedText>,
}

impl ReleaseRecord {
    pub fn new(track: &str, release: &Release) -> Self {
        Self {
            track: track.to_string(),
            name: release.name.clone(),
            version_codes: release.version_codes.clone(),
            status: release.status,
            rollout_fraction: release.rollout_fraction,
            release_notes: release.release_notes.clone(),
        }
    }

    /// Flatten tracks into records, keeping track and release order.
    pub fn from_tracks(tracks: &[Track]) -> Vec<Self> {
        tracks
            .iter()
            .flat_map(|track| {
                track
                    .releases
                    .iter()
                    .map(move |release| Self::new(&track.name, release))
            })
            .collect()
    }
}
