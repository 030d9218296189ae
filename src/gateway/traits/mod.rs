// ABOUTME: Composable capability traits for the publisher API.
// ABOUTME: Defines EditOps, TrackOps, ArtifactOps, ListingOps, MonetizationOps.

mod artifacts;
mod edits;
mod listings;
mod monetization;
mod tracks;

pub use artifacts::ArtifactOps;
pub use edits::EditOps;
pub use listings::ListingOps;
pub use monetization::MonetizationOps;
pub use tracks::TrackOps;

/// Every capability of the remote API.
///
/// Automatically implemented for any type providing all capability traits.
pub trait PublisherGateway: EditOps + TrackOps + ArtifactOps + ListingOps + MonetizationOps {}

impl<T> PublisherGateway for T where T: EditOps + TrackOps + ArtifactOps + ListingOps + MonetizationOps
{}
