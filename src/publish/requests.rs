// ABOUTME: Typed request structures accepted by the publishing operations.
// ABOUTME: Parsed from JSON or built by the CLI, then validated at the boundary.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::gateway::{AppDetails, ImageType, Listing};
use crate::types::{PackageName, ProductId};

use super::release::FULL_ROLLOUT;

/// A request rejected before any remote call was made.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl RequestError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        RequestError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Boundary checks a request must pass before it reaches the gateway.
pub trait Validate {
    fn validate(&self) -> Result<(), RequestError>;
}

/// Parse and validate a JSON request.
pub fn parse<T>(json: &str) -> Result<T, RequestError>
where
    T: DeserializeOwned + Validate,
{
    let request: T = serde_json::from_str(json)?;
    request.validate()?;
    Ok(request)
}

fn require_text(field: &'static str, value: &str) -> Result<(), RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError::Missing(field));
    }
    Ok(())
}

fn require_version_code(version_code: i64) -> Result<(), RequestError> {
    if version_code <= 0 {
        return Err(RequestError::invalid(
            "versionCode",
            format!("must be positive, got {version_code}"),
        ));
    }
    Ok(())
}

fn require_language(language: Option<&str>) -> Result<(), RequestError> {
    match language {
        Some(lang) if lang.trim().is_empty() => Err(RequestError::Missing("language")),
        _ => Ok(()),
    }
}

fn default_rollout() -> f64 {
    FULL_ROLLOUT
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeployRequest {
    pub package_name: PackageName,
    pub track: String,
    pub artifact_path: PathBuf,
    pub version_code: i64,
    #[serde(default)]
    pub release_notes: Option<String>,
    #[serde(default = "default_rollout")]
    pub rollout_fraction: f64,
}

impl Validate for DeployRequest {
    fn validate(&self) -> Result<(), RequestError> {
        require_text("track", &self.track)?;
        if self.artifact_path.as_os_str().is_empty() {
            return Err(RequestError::Missing("artifactPath"));
        }
        require_version_code(self.version_code)?;
        // Range is left to the remote API; only non-numbers are refused here.
        if !self.rollout_fraction.is_finite() {
            return Err(RequestError::invalid(
                "rolloutFraction",
                "must be a finite number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PromoteRequest {
    pub package_name: PackageName,
    pub from_track: String,
    pub to_track: String,
    pub version_code: i64,
}

impl Validate for PromoteRequest {
    fn validate(&self) -> Result<(), RequestError> {
        require_text("fromTrack", &self.from_track)?;
        require_text("toTrack", &self.to_track)?;
        require_version_code(self.version_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetReleasesRequest {
    pub package_name: PackageName,
    /// Only report releases from this track.
    #[serde(default)]
    pub track: Option<String>,
}

impl Validate for GetReleasesRequest {
    fn validate(&self) -> Result<(), RequestError> {
        match &self.track {
            Some(track) => require_text("track", track),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub package_name: PackageName,
    /// Listing language; the configured default when absent.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub full_description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
}

impl UpdateListingRequest {
    pub fn listing(&self) -> Listing {
        Listing {
            title: self.title.clone(),
            full_description: self.full_description.clone(),
            short_description: self.short_description.clone(),
            video: self.video.clone(),
        }
    }
}

impl Validate for UpdateListingRequest {
    fn validate(&self) -> Result<(), RequestError> {
        require_language(self.language.as_deref())?;
        if self.listing().field_names().is_empty() {
            return Err(RequestError::invalid(
                "listing",
                "at least one of title, fullDescription, shortDescription, video is required",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateDetailsRequest {
    pub package_name: PackageName,
    #[serde(default)]
    pub default_language: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_website: Option<String>,
}

impl UpdateDetailsRequest {
    pub fn details(&self) -> AppDetails {
        AppDetails {
            default_language: self.default_language.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            contact_website: self.contact_website.clone(),
        }
    }
}

impl Validate for UpdateDetailsRequest {
    fn validate(&self) -> Result<(), RequestError> {
        if self.details().field_names().is_empty() {
            return Err(RequestError::invalid(
                "details",
                "at least one of defaultLanguage, contactEmail, contactPhone, contactWebsite is required",
            ));
        }
        match &self.contact_email {
            Some(email) if !email.contains('@') => Err(RequestError::invalid(
                "contactEmail",
                format!("'{email}' is not an email address"),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UploadImageRequest {
    pub package_name: PackageName,
    #[serde(default)]
    pub language: Option<String>,
    pub image_type: ImageType,
    pub image_path: PathBuf,
    /// Delete existing images of the same type first.
    #[serde(default)]
    pub replace: bool,
}

impl Validate for UploadImageRequest {
    fn validate(&self) -> Result<(), RequestError> {
        require_language(self.language.as_deref())?;
        if self.image_path.as_os_str().is_empty() {
            return Err(RequestError::Missing("imagePath"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetDataSafetyRequest {
    pub package_name: PackageName,
    pub csv_path: PathBuf,
}

impl Validate for SetDataSafetyRequest {
    fn validate(&self) -> Result<(), RequestError> {
        if self.csv_path.as_os_str().is_empty() {
            return Err(RequestError::Missing("csvPath"));
        }
        Ok(())
    }
}

/// Where a subscription body comes from: inline JSON or a file.
fn validate_payload_source(
    payload: &Option<serde_json::Value>,
    payload_file: &Option<PathBuf>,
) -> Result<(), RequestError> {
    match (payload, payload_file) {
        (Some(_), Some(_)) => Err(RequestError::invalid(
            "payload",
            "give either payload or payloadFile, not both",
        )),
        (None, None) => Err(RequestError::Missing("payload")),
        (Some(value), None) if !value.is_object() => {
            Err(RequestError::invalid("payload", "must be a JSON object"))
        }
        _ => Ok(()),
    }
}

fn require_product_id(product_id: &ProductId) -> Result<(), RequestError> {
    require_text("productId", product_id.as_str())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSubscriptionRequest {
    pub package_name: PackageName,
    pub product_id: ProductId,
    #[serde(default)]
    pub regions_version: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub payload_file: Option<PathBuf>,
}

impl Validate for CreateSubscriptionRequest {
    fn validate(&self) -> Result<(), RequestError> {
        require_product_id(&self.product_id)?;
        validate_payload_source(&self.payload, &self.payload_file)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSubscriptionRequest {
    pub package_name: PackageName,
    pub product_id: ProductId,
    #[serde(default)]
    pub regions_version: Option<String>,
    /// Comma-separated field paths to update; everything in the payload when absent.
    #[serde(default)]
    pub update_mask: Option<String>,
    /// Create the subscription if it does not exist.
    #[serde(default)]
    pub allow_missing: bool,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    #[serde(default)]
    pub payload_file: Option<PathBuf>,
}

impl Validate for UpdateSubscriptionRequest {
    fn validate(&self) -> Result<(), RequestError> {
        require_product_id(&self.product_id)?;
        if let Some(mask) = &self.update_mask {
            require_text("updateMask", mask)?;
        }
        validate_payload_source(&self.payload, &self.payload_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deploy_defaults_to_full_rollout() {
        let request: DeployRequest = parse(
            r#"{"packageName":"com.example.app","track":"beta","artifactPath":"app.aab","versionCode":42}"#,
        )
        .unwrap();
        assert_eq!(request.rollout_fraction, 1.0);
        assert!(request.release_notes.is_none());
    }

    #[test]
    fn deploy_rejects_non_positive_version_code() {
        let err = parse::<DeployRequest>(
            r#"{"packageName":"com.example.app","track":"beta","artifactPath":"app.aab","versionCode":0}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RequestError::Invalid {
                field: "versionCode",
                ..
            }
        ));
    }

    #[test]
    fn deploy_keeps_out_of_range_fraction() {
        let request: DeployRequest = parse(
            r#"{"packageName":"com.example.app","track":"beta","artifactPath":"app.aab","versionCode":1,"rolloutFraction":1.5}"#,
        )
        .unwrap();
        assert_eq!(request.rollout_fraction, 1.5);
    }

    #[test]
    fn invalid_package_name_is_malformed() {
        let err = parse::<PromoteRequest>(
            r#"{"packageName":"noseparator","fromTrack":"beta","toTrack":"production","versionCode":3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse::<GetReleasesRequest>(
            r#"{"packageName":"com.example.app","trak":"beta"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
    }

    #[test]
    fn blank_track_is_missing() {
        let err = parse::<PromoteRequest>(
            r#"{"packageName":"com.example.app","fromTrack":" ","toTrack":"production","versionCode":3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::Missing("fromTrack")));
    }

    #[test]
    fn listing_needs_a_field() {
        let err = parse::<UpdateListingRequest>(r#"{"packageName":"com.example.app"}"#)
            .unwrap_err();
        assert!(matches!(err, RequestError::Invalid { field: "listing", .. }));
    }

    #[test]
    fn image_type_uses_wire_names() {
        let request: UploadImageRequest = parse(
            r#"{"packageName":"com.example.app","imageType":"featureGraphic","imagePath":"fg.png"}"#,
        )
        .unwrap();
        assert_eq!(request.image_type, ImageType::FeatureGraphic);
        assert!(!request.replace);
    }

    #[test]
    fn subscription_needs_exactly_one_payload_source() {
        let both = parse::<CreateSubscriptionRequest>(
            r#"{"packageName":"com.example.app","productId":"premium","payload":{},"payloadFile":"sub.json"}"#,
        )
        .unwrap_err();
        assert!(matches!(both, RequestError::Invalid { field: "payload", .. }));

        let neither = parse::<CreateSubscriptionRequest>(
            r#"{"packageName":"com.example.app","productId":"premium"}"#,
        )
        .unwrap_err();
        assert!(matches!(neither, RequestError::Missing("payload")));
    }

    #[test]
    fn inline_subscription_payload_must_be_object() {
        let err = parse::<UpdateSubscriptionRequest>(
            r#"{"packageName":"com.example.app","productId":"premium","payload":[1,2]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RequestError::Invalid { field: "payload", .. }));
    }
}
