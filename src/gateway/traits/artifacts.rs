// ABOUTME: Binary upload operations scoped to an edit.
// ABOUTME: App bundles and single packages are separate endpoints.

use async_trait::async_trait;
use bytes::Bytes;

use crate::gateway::{GatewayError, UploadedArtifact};
use crate::types::{EditId, PackageName};

#[async_trait]
pub trait ArtifactOps: Send + Sync {
    /// Upload an app bundle (`.aab`).
    async fn upload_bundle(
        &self,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> Result<UploadedArtifact, GatewayError>;

    /// Upload a single installable package.
    async fn upload_package(
        &self,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> Result<UploadedArtifact, GatewayError>;
}
