// ABOUTME: Boundary to the remote release-management API.
// ABOUTME: Capability traits, wire types, errors, and the HTTP and in-memory backends.

mod error;
mod http;
pub mod memory;
pub mod traits;
mod transport;
mod types;

pub use error::{ErrorDetail, GatewayError, GatewayErrorKind};
pub use http::HttpGateway;
pub use memory::MemoryGateway;
pub use traits::{
    ArtifactOps, EditOps, ListingOps, MonetizationOps, PublisherGateway, TrackOps,
};
pub use types::{
    AppDetails, AppEdit, CountryTargeting, ImageType, Listing, LocalizedText, Release,
    ReleaseStatus, Subscription, SubscriptionPatch, Track, UnknownImageType, UploadedArtifact,
};
