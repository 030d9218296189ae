// ABOUTME: Store presence operations: listings, details, images, data safety, subscriptions.
// ABOUTME: Edit-scoped changes use a plain commit and abort the edit on any failure.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DEFAULT_LANGUAGE;
use crate::gateway::{GatewayError, PublisherGateway, Subscription, SubscriptionPatch};
use crate::types::{EditId, PackageName, ProductId};

use super::artifact::{read_local_file, read_local_text};
use super::edit::EditTransaction;
use super::requests::{
    CreateSubscriptionRequest, RequestError, SetDataSafetyRequest, UpdateDetailsRequest,
    UpdateListingRequest, UpdateSubscriptionRequest, UploadImageRequest, Validate,
};
use super::result::OperationResult;
use super::PublishError;

/// Commit `edit` if `outcome` succeeded; otherwise, or if the commit fails, abort it.
async fn commit_or_abort<G: PublisherGateway, T>(
    edit: EditTransaction<'_, G>,
    outcome: Result<T, GatewayError>,
) -> Result<(T, EditId), PublishError> {
    let value = match outcome {
        Ok(value) => value,
        Err(e) => {
            edit.abort().await;
            return Err(e.into());
        }
    };

    match edit.commit().await {
        Ok(edit_id) => Ok((value, edit_id)),
        Err((edit, e)) => {
            edit.abort().await;
            Err(e.into())
        }
    }
}

/// Subscription body sources.
enum Payload<'a> {
    Inline(&'a serde_json::Value),
    File(&'a PathBuf),
}

impl<'a> Payload<'a> {
    fn of(inline: &'a Option<serde_json::Value>, file: &'a Option<PathBuf>) -> Option<Self> {
        match (inline, file) {
            (Some(value), _) => Some(Payload::Inline(value)),
            (None, Some(path)) => Some(Payload::File(path)),
            (None, None) => None,
        }
    }

    /// Load the body and stamp it with the package and product it belongs to.
    async fn resolve(
        source: Option<Payload<'a>>,
        package: &PackageName,
        product_id: &ProductId,
    ) -> Result<serde_json::Value, PublishError> {
        let mut body = match source {
            Some(Payload::Inline(value)) => value.clone(),
            Some(Payload::File(path)) => {
                let text = read_local_text(path).await?;
                serde_json::from_str(&text).map_err(|e| {
                    PublishError::InvalidPayload(format!("{}: {e}", path.display()))
                })?
            }
            None => return Err(PublishError::InvalidPayload("no payload given".to_string())),
        };

        let object = body.as_object_mut().ok_or_else(|| {
            PublishError::InvalidPayload("subscription payload must be a JSON object".to_string())
        })?;
        object.insert("packageName".to_string(), package.as_str().into());
        object.insert("productId".to_string(), product_id.as_str().into());
        Ok(body)
    }
}

fn subscription_result(message: String, subscription: &Subscription) -> OperationResult {
    OperationResult::succeeded(message)
        .with_detail("basePlans", subscription.base_plan_count())
        .with_detail("listings", subscription.listing_count())
}

/// Listing and monetization operations for one gateway.
pub struct StoreOperations<G> {
    gateway: Arc<G>,
    language: String,
}

impl<G: PublisherGateway> StoreOperations<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Language used when a request names none.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn language<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.language)
    }

    pub async fn update_listing(
        &self,
        request: &UpdateListingRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;
        let language = self.language(request.language.as_deref());
        let listing = request.listing();

        let run = async {
            let edit = EditTransaction::open(self.gateway.as_ref(), package).await?;
            let outcome = edit.patch_listing(language, &listing).await;
            commit_or_abort(edit, outcome).await
        };

        Ok(match run.await {
            Ok((_, edit_id)) => {
                tracing::info!(%package, language, edit = %edit_id, "listing updated");
                OperationResult::succeeded(format!("updated {language} listing for {package}"))
                    .with_detail("language", language)
                    .with_detail("updatedFields", listing.field_names())
            }
            Err(e) => OperationResult::failed(
                format!("failed to update {language} listing for {package}: {e}"),
                &e,
            ),
        })
    }

    pub async fn update_details(
        &self,
        request: &UpdateDetailsRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;
        let details = request.details();

        let run = async {
            let edit = EditTransaction::open(self.gateway.as_ref(), package).await?;
            let outcome = edit.patch_details(&details).await;
            commit_or_abort(edit, outcome).await
        };

        Ok(match run.await {
            Ok((_, edit_id)) => {
                tracing::info!(%package, edit = %edit_id, "app details updated");
                OperationResult::succeeded(format!("updated app details for {package}"))
                    .with_detail("updatedFields", details.field_names())
            }
            Err(e) => OperationResult::failed(
                format!("failed to update app details for {package}: {e}"),
                &e,
            ),
        })
    }

    /// Upload one listing image, first clearing existing images of that type
    /// when `replace` is set. The file is read before any edit is opened.
    pub async fn upload_image(
        &self,
        request: &UploadImageRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;
        let language = self.language(request.language.as_deref());
        let image_type = request.image_type;

        let run = async {
            let content = read_local_file(&request.image_path).await?;
            let edit = EditTransaction::open(self.gateway.as_ref(), package).await?;
            let outcome = async {
                let deleted = if request.replace {
                    edit.delete_images(language, image_type).await?
                } else {
                    0
                };
                edit.upload_image(language, image_type, content).await?;
                Ok::<_, GatewayError>(deleted)
            }
            .await;
            commit_or_abort(edit, outcome).await
        };

        Ok(match run.await {
            Ok((deleted, edit_id)) => {
                tracing::info!(%package, language, %image_type, deleted, edit = %edit_id, "image uploaded");
                OperationResult::succeeded(format!(
                    "uploaded {image_type} image for {package} ({language})"
                ))
                .with_detail("imageType", image_type.as_str())
                .with_detail("language", language)
                .with_detail("replaced", deleted)
            }
            Err(e) => OperationResult::failed(
                format!("failed to upload {image_type} image for {package}: {e}"),
                &e,
            ),
        })
    }

    /// Replace the data safety declaration with the contents of a CSV file.
    pub async fn set_data_safety(
        &self,
        request: &SetDataSafetyRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;

        let run = async {
            let csv = read_local_text(&request.csv_path).await?;
            self.gateway.update_data_safety(package, &csv).await?;
            Ok::<_, PublishError>(())
        };

        Ok(match run.await {
            Ok(()) => {
                tracing::info!(%package, "data safety labels updated");
                OperationResult::succeeded(format!("updated data safety labels for {package}"))
            }
            Err(e) => OperationResult::failed(
                format!("failed to update data safety labels for {package}: {e}"),
                &e,
            ),
        })
    }

    pub async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;
        let product_id = &request.product_id;

        let run = async {
            let source = Payload::of(&request.payload, &request.payload_file);
            let body = Payload::resolve(source, package, product_id).await?;
            let created = self
                .gateway
                .create_subscription(package, product_id, request.regions_version.as_deref(), &body)
                .await?;
            Ok::<_, PublishError>(created)
        };

        Ok(match run.await {
            Ok(created) => {
                tracing::info!(%package, %product_id, "subscription created");
                subscription_result(
                    format!("created subscription {product_id} for {package}"),
                    &created,
                )
            }
            Err(e) => OperationResult::failed(
                format!("failed to create subscription {product_id} for {package}: {e}"),
                &e,
            ),
        })
    }

    pub async fn update_subscription(
        &self,
        request: &UpdateSubscriptionRequest,
    ) -> Result<OperationResult, RequestError> {
        request.validate()?;
        let package = &request.package_name;
        let product_id = &request.product_id;
        let patch = SubscriptionPatch {
            regions_version: request.regions_version.clone(),
            update_mask: request.update_mask.clone(),
            allow_missing: request.allow_missing,
        };

        let run = async {
            let source = Payload::of(&request.payload, &request.payload_file);
            let body = Payload::resolve(source, package, product_id).await?;
            let updated = self
                .gateway
                .patch_subscription(package, product_id, &patch, &body)
                .await?;
            Ok::<_, PublishError>(updated)
        };

        Ok(match run.await {
            Ok(updated) => {
                tracing::info!(%package, %product_id, "subscription updated");
                subscription_result(
                    format!("updated subscription {product_id} for {package}"),
                    &updated,
                )
            }
            Err(e) => OperationResult::failed(
                format!("failed to update subscription {product_id} for {package}: {e}"),
                &e,
            ),
        })
    }
}
