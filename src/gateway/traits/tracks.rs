// ABOUTME: Track read and write operations scoped to an edit.
// ABOUTME: List, fetch, and replace a track's releases.

use async_trait::async_trait;

use crate::gateway::{GatewayError, Track};
use crate::types::{EditId, PackageName};

#[async_trait]
pub trait TrackOps: Send + Sync {
    /// All tracks visible in the edit.
    async fn list_tracks(
        &self,
        package: &PackageName,
        edit: &EditId,
    ) -> Result<Vec<Track>, GatewayError>;

    /// A single track by name.
    async fn get_track(
        &self,
        package: &PackageName,
        edit: &EditId,
        track: &str,
    ) -> Result<Track, GatewayError>;

    /// Replace the releases of `track.name` with `track.releases`.
    async fn update_track(
        &self,
        package: &PackageName,
        edit: &EditId,
        track: &Track,
    ) -> Result<Track, GatewayError>;
}
