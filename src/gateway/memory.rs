// ABOUTME: In-memory publisher backend for dry runs and tests.
// ABOUTME: Stages edits like the remote API, records calls, and can script failures.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};

use super::traits::{ArtifactOps, EditOps, ListingOps, MonetizationOps, TrackOps};
use super::{
    AppDetails, AppEdit, ErrorDetail, GatewayError, ImageType, Listing, ReleaseStatus,
    Subscription, SubscriptionPatch, Track, UploadedArtifact,
};
use crate::types::{EditId, PackageName, ProductId};

/// Message the remote API uses when a never-published app receives a non-draft release.
pub const DRAFT_APP_REJECTION: &str =
    "Only releases with status draft may be created on draft app.";

/// Gateway entry points, used to script failures and inspect the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayMethod {
    InsertEdit,
    CommitEdit,
    DeleteEdit,
    ListTracks,
    GetTrack,
    UpdateTrack,
    UploadBundle,
    UploadPackage,
    PatchListing,
    PatchDetails,
    UploadImage,
    DeleteImages,
    UpdateDataSafety,
    CreateSubscription,
    PatchSubscription,
}

impl GatewayMethod {
    fn operation(&self) -> &'static str {
        match self {
            GatewayMethod::InsertEdit => "edits.insert",
            GatewayMethod::CommitEdit => "edits.commit",
            GatewayMethod::DeleteEdit => "edits.delete",
            GatewayMethod::ListTracks => "edits.tracks.list",
            GatewayMethod::GetTrack => "edits.tracks.get",
            GatewayMethod::UpdateTrack => "edits.tracks.update",
            GatewayMethod::UploadBundle => "edits.bundles.upload",
            GatewayMethod::UploadPackage => "edits.apks.upload",
            GatewayMethod::PatchListing => "edits.listings.patch",
            GatewayMethod::PatchDetails => "edits.details.patch",
            GatewayMethod::UploadImage => "edits.images.upload",
            GatewayMethod::DeleteImages => "edits.images.deleteall",
            GatewayMethod::UpdateDataSafety => "applications.dataSafety",
            GatewayMethod::CreateSubscription => "monetization.subscriptions.create",
            GatewayMethod::PatchSubscription => "monetization.subscriptions.patch",
        }
    }
}

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: GatewayMethod,
    pub package: String,
    /// Track name, language, or product ID the call addressed, if any.
    pub target: Option<String>,
}

/// A failure to inject on the next call of a given method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// The draft-app commit rejection, with the message in the structured details.
    DraftOnly,
    Api { status: u16, message: String },
    Transport(String),
}

impl ScriptedFailure {
    fn into_error(self, operation: &str) -> GatewayError {
        match self {
            ScriptedFailure::DraftOnly => draft_app_rejection(operation),
            ScriptedFailure::Api { status, message } => {
                GatewayError::api(operation, status, message.clone(), vec![ErrorDetail::new(message)])
            }
            ScriptedFailure::Transport(message) => {
                GatewayError::transport(operation, std::io::Error::other(message))
            }
        }
    }
}

fn draft_app_rejection(operation: &str) -> GatewayError {
    GatewayError::api(
        operation,
        400,
        "Precondition check failed.",
        vec![ErrorDetail {
            message: DRAFT_APP_REJECTION.to_string(),
            reason: Some("badRequest".to_string()),
            domain: Some("global".to_string()),
        }],
    )
}

/// The part of a package that edits stage and commits publish.
#[derive(Debug, Clone, Default)]
struct Versioned {
    tracks: BTreeMap<String, Track>,
    listings: BTreeMap<String, Listing>,
    details: AppDetails,
    images: HashMap<(String, ImageType), usize>,
    uploads: usize,
}

#[derive(Debug, Default)]
struct PackageState {
    draft_app: bool,
    published: Versioned,
    data_safety: Option<String>,
    subscriptions: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug)]
struct StagedEdit {
    package: String,
    state: Versioned,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_edit: u64,
    packages: HashMap<String, PackageState>,
    edits: HashMap<String, StagedEdit>,
    calls: Vec<RecordedCall>,
    failures: HashMap<GatewayMethod, VecDeque<ScriptedFailure>>,
}

impl MemoryState {
    fn enter(
        &mut self,
        method: GatewayMethod,
        package: &PackageName,
        target: Option<&str>,
    ) -> Result<(), GatewayError> {
        tracing::debug!(?method, %package, target, "memory gateway call");
        self.calls.push(RecordedCall {
            method,
            package: package.to_string(),
            target: target.map(str::to_string),
        });
        match self.failures.get_mut(&method).and_then(VecDeque::pop_front) {
            Some(failure) => Err(failure.into_error(method.operation())),
            None => Ok(()),
        }
    }

    fn package(&mut self, package: &PackageName) -> &mut PackageState {
        self.packages.entry(package.to_string()).or_default()
    }

    fn staged(
        &mut self,
        method: GatewayMethod,
        package: &PackageName,
        edit: &EditId,
    ) -> Result<&mut Versioned, GatewayError> {
        match self.edits.get_mut(edit.as_str()) {
            Some(staged) if staged.package == package.as_str() => Ok(&mut staged.state),
            _ => Err(GatewayError::api(
                method.operation(),
                404,
                format!("edit {edit} not found for {package}"),
                vec![],
            )),
        }
    }
}

/// Publisher backend that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a track directly, as if an earlier edit had committed it.
    pub fn seed_track(&self, package: &PackageName, track: Track) {
        let mut state = self.state.lock();
        state
            .package(package)
            .published
            .tracks
            .insert(track.name.clone(), track);
    }

    /// Make commits reject non-draft releases, like an app that was never published.
    pub fn set_draft_app(&self, package: &PackageName, draft: bool) {
        self.state.lock().package(package).draft_app = draft;
    }

    /// Fail the next call of `method` with `failure`. Failures queue in order.
    pub fn fail_next(&self, method: GatewayMethod, failure: ScriptedFailure) {
        self.state
            .lock()
            .failures
            .entry(method)
            .or_default()
            .push_back(failure);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, method: GatewayMethod) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Edits that were opened but neither committed nor deleted.
    pub fn open_edits(&self) -> usize {
        self.state.lock().edits.len()
    }

    pub fn track(&self, package: &PackageName, name: &str) -> Option<Track> {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .and_then(|p| p.published.tracks.get(name).cloned())
    }

    pub fn listing(&self, package: &PackageName, language: &str) -> Option<Listing> {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .and_then(|p| p.published.listings.get(language).cloned())
    }

    pub fn details(&self, package: &PackageName) -> AppDetails {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .map(|p| p.published.details.clone())
            .unwrap_or_default()
    }

    pub fn image_count(&self, package: &PackageName, language: &str, image_type: ImageType) -> usize {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .and_then(|p| {
                p.published
                    .images
                    .get(&(language.to_string(), image_type))
                    .copied()
            })
            .unwrap_or(0)
    }

    /// Number of binaries published by committed edits.
    pub fn uploads(&self, package: &PackageName) -> usize {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .map_or(0, |p| p.published.uploads)
    }

    pub fn data_safety(&self, package: &PackageName) -> Option<String> {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .and_then(|p| p.data_safety.clone())
    }

    pub fn subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
    ) -> Option<serde_json::Value> {
        let state = self.state.lock();
        state
            .packages
            .get(package.as_str())
            .and_then(|p| p.subscriptions.get(product_id.as_str()).cloned())
    }
}

#[async_trait]
impl EditOps for MemoryGateway {
    async fn insert_edit(&self, package: &PackageName) -> Result<AppEdit, GatewayError> {
        let mut state = self.state.lock();
        state.enter(GatewayMethod::InsertEdit, package, None)?;

        state.next_edit += 1;
        let id = EditId::new(format!("memory-edit-{}", state.next_edit));
        let snapshot = state.package(package).published.clone();
        state.edits.insert(
            id.to_string(),
            StagedEdit {
                package: package.to_string(),
                state: snapshot,
            },
        );

        Ok(AppEdit {
            id,
            expires_at: None,
        })
    }

    async fn commit_edit(&self, package: &PackageName, edit: &EditId) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::CommitEdit;
        state.enter(method, package, None)?;

        let draft_app = state.package(package).draft_app;
        let staged = state.staged(method, package, edit)?;
        let has_live_release = staged
            .tracks
            .values()
            .flat_map(|track| &track.releases)
            .any(|release| release.status != ReleaseStatus::Draft);
        if draft_app && has_live_release {
            return Err(draft_app_rejection(method.operation()));
        }

        if let Some(committed) = state.edits.remove(edit.as_str()) {
            state.package(package).published = committed.state;
        }
        Ok(())
    }

    async fn delete_edit(&self, package: &PackageName, edit: &EditId) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::DeleteEdit;
        state.enter(method, package, None)?;
        state.staged(method, package, edit)?;
        state.edits.remove(edit.as_str());
        Ok(())
    }
}

#[async_trait]
impl TrackOps for MemoryGateway {
    async fn list_tracks(
        &self,
        package: &PackageName,
        edit: &EditId,
    ) -> Result<Vec<Track>, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::ListTracks;
        state.enter(method, package, None)?;
        let staged = state.staged(method, package, edit)?;
        Ok(staged.tracks.values().cloned().collect())
    }

    async fn get_track(
        &self,
        package: &PackageName,
        edit: &EditId,
        track: &str,
    ) -> Result<Track, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::GetTrack;
        state.enter(method, package, Some(track))?;
        let staged = state.staged(method, package, edit)?;
        Ok(staged
            .tracks
            .get(track)
            .cloned()
            .unwrap_or_else(|| Track::new(track, Vec::new())))
    }

    async fn update_track(
        &self,
        package: &PackageName,
        edit: &EditId,
        track: &Track,
    ) -> Result<Track, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::UpdateTrack;
        state.enter(method, package, Some(&track.name))?;
        let staged = state.staged(method, package, edit)?;
        staged.tracks.insert(track.name.clone(), track.clone());
        Ok(track.clone())
    }
}

#[async_trait]
impl ArtifactOps for MemoryGateway {
    async fn upload_bundle(
        &self,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> Result<UploadedArtifact, GatewayError> {
        self.upload(GatewayMethod::UploadBundle, package, edit, content)
    }

    async fn upload_package(
        &self,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> Result<UploadedArtifact, GatewayError> {
        self.upload(GatewayMethod::UploadPackage, package, edit, content)
    }
}

impl MemoryGateway {
    fn upload(
        &self,
        method: GatewayMethod,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> Result<UploadedArtifact, GatewayError> {
        let mut state = self.state.lock();
        state.enter(method, package, None)?;
        if content.is_empty() {
            return Err(GatewayError::api(
                method.operation(),
                400,
                "uploaded file is empty",
                vec![],
            ));
        }
        state.staged(method, package, edit)?.uploads += 1;
        Ok(UploadedArtifact::default())
    }
}

#[async_trait]
impl ListingOps for MemoryGateway {
    async fn patch_listing(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        listing: &Listing,
    ) -> Result<Listing, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::PatchListing;
        state.enter(method, package, Some(language))?;
        let entry = state
            .staged(method, package, edit)?
            .listings
            .entry(language.to_string())
            .or_default();
        entry.merge(listing);
        Ok(entry.clone())
    }

    async fn patch_details(
        &self,
        package: &PackageName,
        edit: &EditId,
        details: &AppDetails,
    ) -> Result<AppDetails, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::PatchDetails;
        state.enter(method, package, None)?;
        let staged = state.staged(method, package, edit)?;
        staged.details.merge(details);
        Ok(staged.details.clone())
    }

    async fn upload_image(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        image_type: ImageType,
        content: Bytes,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::UploadImage;
        state.enter(method, package, Some(language))?;
        if content.is_empty() {
            return Err(GatewayError::api(
                method.operation(),
                400,
                "image is empty",
                vec![],
            ));
        }
        *state
            .staged(method, package, edit)?
            .images
            .entry((language.to_string(), image_type))
            .or_default() += 1;
        Ok(())
    }

    async fn delete_images(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        image_type: ImageType,
    ) -> Result<usize, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::DeleteImages;
        state.enter(method, package, Some(language))?;
        Ok(state
            .staged(method, package, edit)?
            .images
            .remove(&(language.to_string(), image_type))
            .unwrap_or(0))
    }
}

#[async_trait]
impl MonetizationOps for MemoryGateway {
    async fn update_data_safety(
        &self,
        package: &PackageName,
        csv: &str,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::UpdateDataSafety;
        state.enter(method, package, None)?;
        if csv.trim().is_empty() {
            return Err(GatewayError::api(
                method.operation(),
                400,
                "data safety CSV is empty",
                vec![],
            ));
        }
        state.package(package).data_safety = Some(csv.to_string());
        Ok(())
    }

    async fn create_subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
        _regions_version: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<Subscription, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::CreateSubscription;
        state.enter(method, package, Some(product_id.as_str()))?;

        let subscriptions = &mut state.package(package).subscriptions;
        if subscriptions.contains_key(product_id.as_str()) {
            return Err(GatewayError::api(
                method.operation(),
                409,
                format!("subscription {product_id} already exists"),
                vec![],
            ));
        }
        subscriptions.insert(product_id.to_string(), payload.clone());
        Ok(Subscription(payload.clone()))
    }

    async fn patch_subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
        patch: &SubscriptionPatch,
        payload: &serde_json::Value,
    ) -> Result<Subscription, GatewayError> {
        let mut state = self.state.lock();
        let method = GatewayMethod::PatchSubscription;
        state.enter(method, package, Some(product_id.as_str()))?;

        let subscriptions = &mut state.package(package).subscriptions;
        if !patch.allow_missing && !subscriptions.contains_key(product_id.as_str()) {
            return Err(GatewayError::api(
                method.operation(),
                404,
                format!("subscription {product_id} not found"),
                vec![],
            ));
        }
        let current = subscriptions
            .entry(product_id.to_string())
            .or_insert_with(|| serde_json::json!({}));

        if let (Some(target), Some(source)) = (current.as_object_mut(), payload.as_object()) {
            let mask: Option<Vec<&str>> = patch
                .update_mask
                .as_deref()
                .map(|mask| mask.split(',').map(str::trim).collect());
            for (key, value) in source {
                let masked_out = mask
                    .as_ref()
                    .is_some_and(|fields| !fields.contains(&key.as_str()));
                // Identity fields always follow the payload.
                if !masked_out || key == "packageName" || key == "productId" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(Subscription(current.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Release;

    fn pkg() -> PackageName {
        PackageName::new("com.example.app").unwrap()
    }

    fn release(status: ReleaseStatus) -> Release {
        Release {
            name: None,
            version_codes: vec![1],
            status,
            rollout_fraction: None,
            release_notes: vec![],
            country_targeting: None,
            in_app_update_priority: None,
        }
    }

    #[tokio::test]
    async fn staged_tracks_are_invisible_until_commit() {
        let gateway = MemoryGateway::new();
        let edit = gateway.insert_edit(&pkg()).await.unwrap();
        let track = Track::new("beta", vec![release(ReleaseStatus::Completed)]);
        gateway.update_track(&pkg(), &edit.id, &track).await.unwrap();

        assert!(gateway.track(&pkg(), "beta").is_none());
        gateway.commit_edit(&pkg(), &edit.id).await.unwrap();
        assert_eq!(gateway.track(&pkg(), "beta"), Some(track));
        assert_eq!(gateway.open_edits(), 0);
    }

    #[tokio::test]
    async fn draft_app_rejects_live_releases() {
        let gateway = MemoryGateway::new();
        gateway.set_draft_app(&pkg(), true);
        let edit = gateway.insert_edit(&pkg()).await.unwrap();
        let track = Track::new("internal", vec![release(ReleaseStatus::Completed)]);
        gateway.update_track(&pkg(), &edit.id, &track).await.unwrap();

        let err = gateway.commit_edit(&pkg(), &edit.id).await.unwrap_err();
        assert_eq!(err.details()[0].message, DRAFT_APP_REJECTION);
        assert_eq!(gateway.open_edits(), 1);
    }

    #[tokio::test]
    async fn scripted_failures_fire_once() {
        let gateway = MemoryGateway::new();
        gateway.fail_next(
            GatewayMethod::InsertEdit,
            ScriptedFailure::Transport("connection reset".into()),
        );

        assert!(gateway.insert_edit(&pkg()).await.is_err());
        assert!(gateway.insert_edit(&pkg()).await.is_ok());
        assert_eq!(gateway.call_count(GatewayMethod::InsertEdit), 2);
    }

    #[tokio::test]
    async fn unknown_edit_is_not_found() {
        let gateway = MemoryGateway::new();
        let err = gateway
            .commit_edit(&pkg(), &EditId::new("missing"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
