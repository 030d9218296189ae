// ABOUTME: Store listing, app details, and image operations scoped to an edit.
// ABOUTME: Patches only the fields provided and manages images per language.

use async_trait::async_trait;
use bytes::Bytes;

use crate::gateway::{AppDetails, GatewayError, ImageType, Listing};
use crate::types::{EditId, PackageName};

#[async_trait]
pub trait ListingOps: Send + Sync {
    async fn patch_listing(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        listing: &Listing,
    ) -> Result<Listing, GatewayError>;

    async fn patch_details(
        &self,
        package: &PackageName,
        edit: &EditId,
        details: &AppDetails,
    ) -> Result<AppDetails, GatewayError>;

    async fn upload_image(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        image_type: ImageType,
        content: Bytes,
    ) -> Result<(), GatewayError>;

    /// Remove every image of `image_type` for the language. Returns how many were deleted.
    async fn delete_images(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        image_type: ImageType,
    ) -> Result<usize, GatewayError>;
}
