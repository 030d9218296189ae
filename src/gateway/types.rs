// ABOUTME: Wire types shared by the gateway traits.
// ABOUTME: Tracks, releases, listings, details, image kinds and subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{EditId, ProductId};

/// An open edit as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEdit {
    pub id: EditId,
    /// When the remote side will discard the edit if it is never committed.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of a release within a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseStatus {
    Draft,
    InProgress,
    Halted,
    Completed,
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReleaseStatus::Draft => "draft",
            ReleaseStatus::InProgress => "inProgress",
            ReleaseStatus::Halted => "halted",
            ReleaseStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Text tagged with a BCP-47 language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryTargeting {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_rest_of_world: Option<bool>,
}

/// One versioned rollout unit within a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, with = "version_codes", skip_serializing_if = "Vec::is_empty")]
    pub version_codes: Vec<i64>,
    pub status: ReleaseStatus,
    /// Share of the user base receiving this release; only meaningful while in progress.
    #[serde(
        rename = "userFraction",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rollout_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_notes: Vec<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_targeting: Option<CountryTargeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_app_update_priority: Option<i32>,
}

impl Release {
    pub fn contains_version(&self, version_code: i64) -> bool {
        self.version_codes.contains(&version_code)
    }
}

/// A named release channel and its releases, in API order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "track")]
    pub name: String,
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl Track {
    pub fn new(name: impl Into<String>, releases: Vec<Release>) -> Self {
        Self {
            name: name.into(),
            releases,
        }
    }

    /// First release whose version codes include `version_code`.
    pub fn find_release(&self, version_code: i64) -> Option<&Release> {
        self.releases
            .iter()
            .find(|release| release.contains_version(version_code))
    }
}

/// Version codes travel as decimal strings; numbers are accepted on input too.
mod version_codes {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    pub fn serialize<S: Serializer>(codes: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(codes.iter().map(|code| code.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        Vec::<Code>::deserialize(deserializer)?
            .into_iter()
            .map(|code| match code {
                Code::Number(n) => Ok(n),
                Code::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                    serde::de::Error::custom(format!("invalid version code: {s}"))
                }),
            })
            .collect()
    }
}

/// Result of a binary upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Store listing text for one language. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl Listing {
    /// Names of the fields this patch sets, in wire form.
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("fullDescription", self.full_description.is_some()),
            ("shortDescription", self.short_description.is_some()),
            ("video", self.video.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    pub fn merge(&mut self, patch: &Listing) {
        merge_field(&mut self.title, &patch.title);
        merge_field(&mut self.full_description, &patch.full_description);
        merge_field(&mut self.short_description, &patch.short_description);
        merge_field(&mut self.video, &patch.video);
    }
}

/// App-level contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_website: Option<String>,
}

impl AppDetails {
    pub fn field_names(&self) -> Vec<&'static str> {
        [
            ("defaultLanguage", self.default_language.is_some()),
            ("contactEmail", self.contact_email.is_some()),
            ("contactPhone", self.contact_phone.is_some()),
            ("contactWebsite", self.contact_website.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    pub fn merge(&mut self, patch: &AppDetails) {
        merge_field(&mut self.default_language, &patch.default_language);
        merge_field(&mut self.contact_email, &patch.contact_email);
        merge_field(&mut self.contact_phone, &patch.contact_phone);
        merge_field(&mut self.contact_website, &patch.contact_website);
    }
}

fn merge_field(target: &mut Option<String>, patch: &Option<String>) {
    if let Some(value) = patch {
        *target = Some(value.clone());
    }
}

/// Kinds of store listing images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageType {
    PhoneScreenshots,
    SevenInchScreenshots,
    TenInchScreenshots,
    TvScreenshots,
    WearScreenshots,
    Icon,
    FeatureGraphic,
    TvBanner,
}

impl ImageType {
    pub const ALL: [ImageType; 8] = [
        ImageType::PhoneScreenshots,
        ImageType::SevenInchScreenshots,
        ImageType::TenInchScreenshots,
        ImageType::TvScreenshots,
        ImageType::WearScreenshots,
        ImageType::Icon,
        ImageType::FeatureGraphic,
        ImageType::TvBanner,
    ];

    /// Name used in API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::PhoneScreenshots => "phoneScreenshots",
            ImageType::SevenInchScreenshots => "sevenInchScreenshots",
            ImageType::TenInchScreenshots => "tenInchScreenshots",
            ImageType::TvScreenshots => "tvScreenshots",
            ImageType::WearScreenshots => "wearScreenshots",
            ImageType::Icon => "icon",
            ImageType::FeatureGraphic => "featureGraphic",
            ImageType::TvBanner => "tvBanner",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown image type: {0}")]
pub struct UnknownImageType(pub String);

impl FromStr for ImageType {
    type Err = UnknownImageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownImageType(s.to_string()))
    }
}

/// Query options for patching a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionPatch {
    pub regions_version: Option<String>,
    pub update_mask: Option<String>,
    pub allow_missing: bool,
}

/// A subscription product as the API returns it.
///
/// The body is kept as raw JSON; only the counts needed for reporting are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subscription(pub serde_json::Value);

impl Subscription {
    pub fn product_id(&self) -> Option<ProductId> {
        self.0
            .get("productId")
            .and_then(|v| v.as_str())
            .map(ProductId::new)
    }

    pub fn base_plan_count(&self) -> usize {
        self.array_len("basePlans")
    }

    pub fn listing_count(&self) -> usize {
        self.array_len("listings")
    }

    fn array_len(&self, field: &str) -> usize {
        self.0
            .get(field)
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn release_round_trips_wire_names() {
        let wire = json!({
            "name": "1.2.0",
            "versionCodes": ["42", "43"],
            "status": "inProgress",
            "userFraction": 0.25,
            "releaseNotes": [{"language": "en-US", "text": "Fixes"}],
            "countryTargeting": {"countries": ["DE"], "includeRestOfWorld": false},
            "inAppUpdatePriority": 3
        });

        let release: Release = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(release.version_codes, vec![42, 43]);
        assert_eq!(release.status, ReleaseStatus::InProgress);
        assert_eq!(release.rollout_fraction, Some(0.25));
        assert_eq!(release.in_app_update_priority, Some(3));

        assert_eq!(serde_json::to_value(&release).unwrap(), wire);
    }

    #[test]
    fn numeric_version_codes_are_accepted() {
        let release: Release =
            serde_json::from_value(json!({"versionCodes": [7], "status": "draft"})).unwrap();
        assert_eq!(release.version_codes, vec![7]);
    }

    #[test]
    fn garbage_version_code_is_rejected() {
        let result: Result<Release, _> =
            serde_json::from_value(json!({"versionCodes": ["seven"], "status": "draft"}));
        assert!(result.is_err());
    }

    #[test]
    fn completed_release_omits_fraction() {
        let release = Release {
            name: None,
            version_codes: vec![1],
            status: ReleaseStatus::Completed,
            rollout_fraction: None,
            release_notes: vec![],
            country_targeting: None,
            in_app_update_priority: None,
        };
        let value = serde_json::to_value(&release).unwrap();
        assert_eq!(value, json!({"versionCodes": ["1"], "status": "completed"}));
    }

    #[test]
    fn track_without_releases_deserializes() {
        let track: Track = serde_json::from_value(json!({"track": "beta"})).unwrap();
        assert_eq!(track.name, "beta");
        assert!(track.releases.is_empty());
    }

    #[test]
    fn image_type_parses_case_insensitively() {
        assert_eq!(
            "FEATUREGRAPHIC".parse::<ImageType>().unwrap(),
            ImageType::FeatureGraphic
        );
        assert!("banner".parse::<ImageType>().is_err());
    }

    #[test]
    fn listing_field_names_only_lists_set_fields() {
        let listing = Listing {
            title: Some("App".into()),
            video: Some("https://example.com/v".into()),
            ..Default::default()
        };
        assert_eq!(listing.field_names(), vec!["title", "video"]);
    }

    #[test]
    fn subscription_counts_plans_and_listings() {
        let sub = Subscription(json!({
            "productId": "premium",
            "basePlans": [{"basePlanId": "monthly"}, {"basePlanId": "yearly"}],
            "listings": [{"languageCode": "en-US"}]
        }));
        assert_eq!(sub.product_id(), Some(ProductId::new("premium")));
        assert_eq!(sub.base_plan_count(), 2);
        assert_eq!(sub.listing_count(), 1);
    }
}
