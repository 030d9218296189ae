// ABOUTME: Edit lifecycle operations.
// ABOUTME: Insert, commit, and delete versioned edit transactions.

use async_trait::async_trait;

use crate::gateway::{AppEdit, GatewayError};
use crate::types::{EditId, PackageName};

/// Edit lifecycle: every versioned mutation happens inside an edit.
#[async_trait]
pub trait EditOps: Send + Sync {
    /// Open a new edit for the package.
    async fn insert_edit(&self, package: &PackageName) -> Result<AppEdit, GatewayError>;

    /// Finalize every change staged in the edit.
    async fn commit_edit(&self, package: &PackageName, edit: &EditId) -> Result<(), GatewayError>;

    /// Discard the edit and everything staged in it.
    async fn delete_edit(&self, package: &PackageName, edit: &EditId) -> Result<(), GatewayError>;
}
