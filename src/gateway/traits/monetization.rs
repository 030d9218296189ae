// ABOUTME: Operations against non-versioned endpoints.
// ABOUTME: Data-safety labels and subscription products bypass edits entirely.

use async_trait::async_trait;

use crate::gateway::{GatewayError, Subscription, SubscriptionPatch};
use crate::types::{PackageName, ProductId};

#[async_trait]
pub trait MonetizationOps: Send + Sync {
    /// Replace the data-safety declaration with the given CSV export.
    async fn update_data_safety(&self, package: &PackageName, csv: &str)
    -> Result<(), GatewayError>;

    async fn create_subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
        regions_version: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<Subscription, GatewayError>;

    async fn patch_subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
        patch: &SubscriptionPatch,
        payload: &serde_json::Value,
    ) -> Result<Subscription, GatewayError>;
}
