// ABOUTME: Publishing operations built on the versioned-edit protocol.
// ABOUTME: Edit lifecycle, draft fallback commit, release building, and result values.

mod artifact;
mod classifier;
mod commit;
mod deployment;
mod edit;
mod error;
mod release;
mod requests;
mod result;
mod store;

pub use artifact::{ArtifactFormat, read_local_file, read_local_text};
pub use classifier::{
    DRAFT_ONLY_SIGNATURE, ErrorFrame, ErrorTrace, is_draft_only_rejection,
    matches_draft_only_signature,
};
pub use commit::{CommitReport, commit_with_draft_fallback, force_to_draft, force_track_to_draft};
pub use deployment::DeploymentOperations;
pub use edit::{CommitResult, EditTransaction};
pub use error::{PublishError, PublishErrorKind};
pub use release::{FULL_ROLLOUT, build_release, promoted_release};
pub use requests::{
    CreateSubscriptionRequest, DeployRequest, GetReleasesRequest, PromoteRequest, RequestError,
    SetDataSafetyRequest, UpdateDetailsRequest, UpdateListingRequest, UpdateSubscriptionRequest,
    UploadImageRequest, Validate, parse,
};
pub use result::{DeploymentResult, OperationResult, ReleaseRecord};
pub use store::StoreOperations;
