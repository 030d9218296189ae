// ABOUTME: Edit transaction lifecycle: open, mutate, commit, abort.
// ABOUTME: Every versioned mutation is scoped to one open edit.

use bytes::Bytes;

use crate::gateway::{
    AppDetails, AppEdit, GatewayError, ImageType, Listing, PublisherGateway, Track,
    UploadedArtifact,
};
use crate::types::{EditId, PackageName};

use super::artifact::ArtifactFormat;

/// Result of a commit attempt. On failure the transaction is handed back so
/// the caller can recover, retry, or abort it.
pub type CommitResult<'g, G> = Result<EditId, (EditTransaction<'g, G>, GatewayError)>;

/// An open edit on one package.
///
/// The transaction ends when `commit` succeeds or `abort` is called; both
/// consume it, so an edit is deleted at most once. Dropping an uncommitted
/// transaction leaves the remote edit to expire on its own.
pub struct EditTransaction<'g, G> {
    gateway: &'g G,
    package: PackageName,
    edit: AppEdit,
}

impl<G> std::fmt::Debug for EditTransaction<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditTransaction")
            .field("package", &self.package)
            .field("edit", &self.edit.id)
            .finish()
    }
}

impl<'g, G: PublisherGateway> EditTransaction<'g, G> {
    /// Open a new edit for `package`.
    pub async fn open(gateway: &'g G, package: &PackageName) -> Result<Self, GatewayError> {
        let edit = gateway.insert_edit(package).await?;
        tracing::info!(
            %package,
            edit = %edit.id,
            expires_at = ?edit.expires_at,
            "opened edit"
        );
        Ok(Self {
            gateway,
            package: package.clone(),
            edit,
        })
    }

    pub fn id(&self) -> &EditId {
        &self.edit.id
    }

    pub fn package(&self) -> &PackageName {
        &self.package
    }

    /// Plain commit: a single attempt with no recovery.
    pub async fn commit(self) -> CommitResult<'g, G> {
        match self.gateway.commit_edit(&self.package, &self.edit.id).await {
            Ok(()) => {
                tracing::info!(package = %self.package, edit = %self.edit.id, "committed edit");
                Ok(self.edit.id)
            }
            Err(e) => Err((self, e)),
        }
    }

    /// Best-effort delete of the edit. A failing delete is logged and ignored,
    /// since the caller is already handling a more important error.
    pub async fn abort(self) {
        match self.gateway.delete_edit(&self.package, &self.edit.id).await {
            Ok(()) => {
                tracing::debug!(package = %self.package, edit = %self.edit.id, "deleted edit");
            }
            Err(e) => {
                tracing::warn!(
                    package = %self.package,
                    edit = %self.edit.id,
                    error = %e,
                    "failed to delete edit"
                );
            }
        }
    }

    pub async fn list_tracks(&self) -> Result<Vec<Track>, GatewayError> {
        self.gateway.list_tracks(&self.package, &self.edit.id).await
    }

    pub async fn get_track(&self, name: &str) -> Result<Track, GatewayError> {
        self.gateway
            .get_track(&self.package, &self.edit.id, name)
            .await
    }

    pub async fn update_track(&self, track: &Track) -> Result<Track, GatewayError> {
        tracing::debug!(
            package = %self.package,
            edit = %self.edit.id,
            track = %track.name,
            releases = track.releases.len(),
            "updating track"
        );
        self.gateway
            .update_track(&self.package, &self.edit.id, track)
            .await
    }

    pub async fn upload_bundle(&self, content: Bytes) -> Result<UploadedArtifact, GatewayError> {
        self.gateway
            .upload_bundle(&self.package, &self.edit.id, content)
            .await
    }

    pub async fn upload_package(&self, content: Bytes) -> Result<UploadedArtifact, GatewayError> {
        self.gateway
            .upload_package(&self.package, &self.edit.id, content)
            .await
    }

    /// Upload through the endpoint matching `format`.
    pub async fn upload_artifact(
        &self,
        format: ArtifactFormat,
        content: Bytes,
    ) -> Result<UploadedArtifact, GatewayError> {
        tracing::info!(
            package = %self.package,
            edit = %self.edit.id,
            %format,
            bytes = content.len(),
            "uploading artifact"
        );
        match format {
            ArtifactFormat::Bundle => self.upload_bundle(content).await,
            ArtifactFormat::Package => self.upload_package(content).await,
        }
    }

    pub async fn patch_listing(
        &self,
        language: &str,
        listing: &Listing,
    ) -> Result<Listing, GatewayError> {
        self.gateway
            .patch_listing(&self.package, &self.edit.id, language, listing)
            .await
    }

    pub async fn patch_details(&self, details: &AppDetails) -> Result<AppDetails, GatewayError> {
        self.gateway
            .patch_details(&self.package, &self.edit.id, details)
            .await
    }

    pub async fn upload_image(
        &self,
        language: &str,
        image_type: ImageType,
        content: Bytes,
    ) -> Result<(), GatewayError> {
        self.gateway
            .upload_image(&self.package, &self.edit.id, language, image_type, content)
            .await
    }

    pub async fn delete_images(
        &self,
        language: &str,
        image_type: ImageType,
    ) -> Result<usize, GatewayError> {
        self.gateway
            .delete_images(&self.package, &self.edit.id, language, image_type)
            .await
    }
}
