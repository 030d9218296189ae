// ABOUTME: Deploy, promote, and release listing over the edit protocol.
// ABOUTME: Deploy and promote commit through the draft fallback and never abort.

use std::sync::Arc;

use crate::config::DEFAULT_LANGUAGE;
use crate::gateway::{PublisherGateway, Track};
use crate::types::PackageName;

use super::artifact::{ArtifactFormat, read_local_file};
use super::commit::{CommitReport, commit_with_draft_fallback};
use super::edit::EditTransaction;
use super::release::{FULL_ROLLOUT, build_release, promoted_release};
use super::requests::{DeployRequest, GetReleasesRequest, PromoteRequest, RequestError, Validate};
use super::result::{DeploymentResult, OperationResult, ReleaseRecord};
use super::PublishError;

/// Track-level operations: upload and roll out, promote, list.
pub struct DeploymentOperations<G> {
    gateway: Arc<G>,
    language: String,
}

impl<G: PublisherGateway> DeploymentOperations<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language used to tag release notes.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Upload an artifact and publish it to a track.
    ///
    /// A fraction of `1.0` completes the release; anything else starts a
    /// staged rollout. On failure the edit is left to expire remotely.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeploymentResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;

        let result = match self.run_deploy(request).await {
            Ok(report) => {
                let rollout = if report.recovered() {
                    "as draft (app not yet published)".to_string()
                } else if request.rollout_fraction == FULL_ROLLOUT {
                    "to all users".to_string()
                } else {
                    format!("at rollout fraction {}", request.rollout_fraction)
                };
                DeploymentResult::succeeded(
                    report.edit_id,
                    package.as_str(),
                    &request.track,
                    request.version_code,
                    format!(
                        "deployed version {} to {} {rollout}",
                        request.version_code, request.track
                    ),
                )
            }
            Err(e) => DeploymentResult::failed(
                package.as_str(),
                &request.track,
                request.version_code,
                format!("deployment to {} failed: {e}", request.track),
                &e,
            ),
        };

        log_deployment(&result);
        Ok(result)
    }

    async fn run_deploy(&self, request: &DeployRequest) -> Result<CommitReport, PublishError> {
        let edit = EditTransaction::open(self.gateway.as_ref(), &request.package_name).await?;

        let content = read_local_file(&request.artifact_path).await?;
        let format = ArtifactFormat::from_path(&request.artifact_path);
        edit.upload_artifact(format, content).await?;

        let release = build_release(
            vec![request.version_code],
            request.rollout_fraction,
            request.release_notes.as_deref(),
            &self.language,
        );
        edit.update_track(&Track::new(&request.track, vec![release]))
            .await?;

        commit_with_draft_fallback(edit)
            .await
            .map_err(|(_edit, e)| PublishError::from(e))
    }

    /// Copy a release from one track to another at full rollout.
    pub async fn promote(
        &self,
        request: &PromoteRequest,
    ) -> Result<DeploymentResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;

        let result = match self.run_promote(request).await {
            Ok(report) => DeploymentResult::succeeded(
                report.edit_id,
                package.as_str(),
                &request.to_track,
                request.version_code,
                format!(
                    "promoted version {} from {} to {}",
                    request.version_code, request.from_track, request.to_track
                ),
            ),
            Err(e) => DeploymentResult::failed(
                package.as_str(),
                &request.to_track,
                request.version_code,
                format!(
                    "promotion from {} to {} failed: {e}",
                    request.from_track, request.to_track
                ),
                &e,
            ),
        };

        log_deployment(&result);
        Ok(result)
    }

    async fn run_promote(&self, request: &PromoteRequest) -> Result<CommitReport, PublishError> {
        let edit = EditTransaction::open(self.gateway.as_ref(), &request.package_name).await?;

        let source = edit.get_track(&request.from_track).await?;
        let release = source.find_release(request.version_code).ok_or_else(|| {
            PublishError::VersionNotFound {
                track: request.from_track.clone(),
                version_code: request.version_code,
            }
        })?;

        let target = Track::new(&request.to_track, vec![promoted_release(release)]);
        edit.update_track(&target).await?;

        commit_with_draft_fallback(edit)
            .await
            .map_err(|(_edit, e)| PublishError::from(e))
    }

    /// Report the releases on every track, or on one track when requested.
    pub async fn get_releases(
        &self,
        request: &GetReleasesRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;

        let releases = self
            .list_releases(&request.package_name)
            .await
            .and_then(|records| {
                let records: Vec<_> = match &request.track {
                    Some(track) => records.into_iter().filter(|r| &r.track == track).collect(),
                    None => records,
                };
                let json = serde_json::to_value(&records)
                    .map_err(|e| PublishError::InvalidPayload(format!("releases: {e}")))?;
                Ok((records.len(), json))
            });

        let result = match releases {
            Ok((count, json)) => OperationResult::succeeded(format!(
                "found {count} release(s) for {}",
                request.package_name
            ))
            .with_detail("releases", json),
            Err(e) => OperationResult::failed(
                format!("failed to list releases for {}: {e}", request.package_name),
                &e,
            ),
        };
        Ok(result)
    }

    /// Snapshot of all releases. The edit used for reading is always deleted.
    pub async fn list_releases(
        &self,
        package: &PackageName,
    ) -> Result<Vec<ReleaseRecord>, PublishError> {
        let edit = EditTransaction::open(self.gateway.as_ref(), package).await?;
        let tracks = edit.list_tracks().await;
        edit.abort().await;
        Ok(ReleaseRecord::from_tracks(&tracks?))
    }
}

fn log_deployment(result: &DeploymentResult) {
    if result.success {
        tracing::info!(
            package = %result.package_name,
            track = %result.track,
            version_code = result.version_code,
            "{}",
            result.message
        );
    } else {
        tracing::warn!(
            package = %result.package_name,
            track = %result.track,
            version_code = result.version_code,
            "{}",
            result.message
        );
    }
}
