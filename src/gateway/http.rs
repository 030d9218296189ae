// ABOUTME: Publisher gateway backed by the Android Publisher v3 REST API.
// ABOUTME: Maps each capability trait method onto its endpoint and decodes API errors.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::DateTime;
use http_body_util::Full;
use hyper::{Method, Request, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::traits::{ArtifactOps, EditOps, ListingOps, MonetizationOps, TrackOps};
use super::transport::{HttpResponse, Transport};
use super::{
    AppDetails, AppEdit, ErrorDetail, GatewayError, ImageType, Listing, Subscription,
    SubscriptionPatch, Track, UploadedArtifact,
};
use crate::config::{ApiConfig, Credentials};
use crate::error::Result;
use crate::types::{EditId, PackageName, ProductId};

const USER_AGENT: &str = concat!("trackctl/", env!("CARGO_PKG_VERSION"));

enum Body {
    Empty,
    Json(Vec<u8>),
    Binary { content_type: &'static str, content: Bytes },
}

/// Error envelope returned by Google APIs.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditResource {
    id: String,
    #[serde(default)]
    expiry_time_seconds: Option<String>,
}

#[derive(Deserialize)]
struct TrackList {
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResource {
    #[serde(default)]
    version_code: Option<i64>,
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default)]
    binary: Option<BinaryResource>,
}

#[derive(Deserialize)]
struct BinaryResource {
    #[serde(default)]
    sha256: Option<String>,
}

#[derive(Deserialize)]
struct DeletedImages {
    #[serde(default)]
    deleted: Vec<serde_json::Value>,
}

/// Gateway talking to the remote publisher API over HTTPS.
#[derive(Debug)]
pub struct HttpGateway {
    transport: Transport,
    base_url: String,
    upload_base_url: String,
    credentials: Credentials,
}

impl HttpGateway {
    pub fn new(api: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let needs_tls =
            api.base_url.starts_with("https://") || api.upload_base_url.starts_with("https://");
        let transport = if needs_tls {
            Transport::with_tls(
                api.ca_bundle.as_deref(),
                api.connect_timeout,
                api.request_timeout,
            )?
        } else {
            Transport::plain(api.connect_timeout, api.request_timeout)
        };

        Ok(Self {
            transport,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            upload_base_url: api.upload_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn app_url(&self, package: &PackageName, tail: &str) -> String {
        format!(
            "{}/applications/{}{}",
            self.base_url,
            urlencoding::encode(package.as_str()),
            tail
        )
    }

    fn edit_url(&self, package: &PackageName, edit: &EditId, tail: &str) -> String {
        self.app_url(
            package,
            &format!("/edits/{}{}", urlencoding::encode(edit.as_str()), tail),
        )
    }

    fn upload_url(&self, package: &PackageName, edit: &EditId, tail: &str) -> String {
        format!(
            "{}/applications/{}/edits/{}{}?uploadType=media",
            self.upload_base_url,
            urlencoding::encode(package.as_str()),
            urlencoding::encode(edit.as_str()),
            tail
        )
    }

    async fn execute(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Body,
    ) -> std::result::Result<HttpResponse, GatewayError> {
        tracing::debug!(operation, %method, url, "publisher API request");

        let builder = Request::builder()
            .method(method)
            .uri(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.credentials.access_token()),
            );
        let request = match body {
            Body::Empty => builder.body(Full::new(Bytes::new())),
            Body::Json(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(json))),
            Body::Binary {
                content_type,
                content,
            } => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Full::new(content)),
        }
        .map_err(|e| GatewayError::InvalidRequest {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.transport.send(operation, request).await?;
        if response.status.is_success() {
            Ok(response)
        } else {
            Err(decode_api_error(operation, &response))
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Body,
    ) -> std::result::Result<T, GatewayError> {
        let response = self.execute(operation, method, url, body).await?;
        serde_json::from_slice(&response.body).map_err(|source| GatewayError::Decode {
            operation: operation.to_string(),
            source,
        })
    }

    async fn call_unit(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Body,
    ) -> std::result::Result<(), GatewayError> {
        self.execute(operation, method, url, body).await.map(|_| ())
    }

    async fn upload(
        &self,
        operation: &str,
        url: &str,
        content: Bytes,
    ) -> std::result::Result<UploadedArtifact, GatewayError> {
        let body = Body::Binary {
            content_type: "application/octet-stream",
            content,
        };
        let uploaded: UploadResource = self.call(operation, Method::POST, url, body).await?;
        Ok(UploadedArtifact {
            version_code: uploaded.version_code,
            sha256: uploaded
                .sha256
                .or_else(|| uploaded.binary.and_then(|b| b.sha256)),
        })
    }
}

fn json_body<T: serde::Serialize>(
    operation: &str,
    value: &T,
) -> std::result::Result<Body, GatewayError> {
    serde_json::to_vec(value)
        .map(Body::Json)
        .map_err(|e| GatewayError::InvalidRequest {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
}

fn decode_api_error(operation: &str, response: &HttpResponse) -> GatewayError {
    let status = response.status.as_u16();
    match serde_json::from_slice::<ErrorEnvelope>(&response.body) {
        Ok(envelope) => GatewayError::api(
            operation,
            status,
            envelope.error.message,
            envelope.error.errors,
        ),
        Err(_) => {
            let text = String::from_utf8_lossy(&response.body);
            let message = match text.trim() {
                "" => response
                    .status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
                text => text.chars().take(512).collect(),
            };
            GatewayError::api(operation, status, message, Vec::new())
        }
    }
}

/// Pick an image MIME type from the file signature.
fn image_content_type(content: &[u8]) -> &'static str {
    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
    if content.starts_with(PNG_SIGNATURE) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

fn query(pairs: &[(&str, Option<&str>)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| value.map(|v| format!("{key}={}", urlencoding::encode(v))))
        .collect();
    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

#[async_trait]
impl EditOps for HttpGateway {
    async fn insert_edit(
        &self,
        package: &PackageName,
    ) -> std::result::Result<AppEdit, GatewayError> {
        let operation = "edits.insert";
        let url = self.app_url(package, "/edits");
        let edit: EditResource = self
            .call(operation, Method::POST, &url, Body::Json(b"{}".to_vec()))
            .await?;

        let expires_at = edit
            .expiry_time_seconds
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        Ok(AppEdit {
            id: EditId::new(edit.id),
            expires_at,
        })
    }

    async fn commit_edit(
        &self,
        package: &PackageName,
        edit: &EditId,
    ) -> std::result::Result<(), GatewayError> {
        let url = self.edit_url(package, edit, ":commit");
        self.call_unit("edits.commit", Method::POST, &url, Body::Empty)
            .await
    }

    async fn delete_edit(
        &self,
        package: &PackageName,
        edit: &EditId,
    ) -> std::result::Result<(), GatewayError> {
        let url = self.edit_url(package, edit, "");
        self.call_unit("edits.delete", Method::DELETE, &url, Body::Empty)
            .await
    }
}

#[async_trait]
impl TrackOps for HttpGateway {
    async fn list_tracks(
        &self,
        package: &PackageName,
        edit: &EditId,
    ) -> std::result::Result<Vec<Track>, GatewayError> {
        let url = self.edit_url(package, edit, "/tracks");
        let list: TrackList = self
            .call("edits.tracks.list", Method::GET, &url, Body::Empty)
            .await?;
        Ok(list.tracks)
    }

    async fn get_track(
        &self,
        package: &PackageName,
        edit: &EditId,
        track: &str,
    ) -> std::result::Result<Track, GatewayError> {
        let url = self.edit_url(
            package,
            edit,
            &format!("/tracks/{}", urlencoding::encode(track)),
        );
        self.call("edits.tracks.get", Method::GET, &url, Body::Empty)
            .await
    }

    async fn update_track(
        &self,
        package: &PackageName,
        edit: &EditId,
        track: &Track,
    ) -> std::result::Result<Track, GatewayError> {
        let operation = "edits.tracks.update";
        let url = self.edit_url(
            package,
            edit,
            &format!("/tracks/{}", urlencoding::encode(&track.name)),
        );
        let body = json_body(operation, track)?;
        self.call(operation, Method::PUT, &url, body).await
    }
}

#[async_trait]
impl ArtifactOps for HttpGateway {
    async fn upload_bundle(
        &self,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> std::result::Result<UploadedArtifact, GatewayError> {
        let url = self.upload_url(package, edit, "/bundles");
        self.upload("edits.bundles.upload", &url, content).await
    }

    async fn upload_package(
        &self,
        package: &PackageName,
        edit: &EditId,
        content: Bytes,
    ) -> std::result::Result<UploadedArtifact, GatewayError> {
        let url = self.upload_url(package, edit, "/apks");
        self.upload("edits.apks.upload", &url, content).await
    }
}

#[async_trait]
impl ListingOps for HttpGateway {
    async fn patch_listing(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        listing: &Listing,
    ) -> std::result::Result<Listing, GatewayError> {
        let operation = "edits.listings.patch";
        let url = self.edit_url(
            package,
            edit,
            &format!("/listings/{}", urlencoding::encode(language)),
        );
        let body = json_body(operation, listing)?;
        self.call(operation, Method::PATCH, &url, body).await
    }

    async fn patch_details(
        &self,
        package: &PackageName,
        edit: &EditId,
        details: &AppDetails,
    ) -> std::result::Result<AppDetails, GatewayError> {
        let operation = "edits.details.patch";
        let url = self.edit_url(package, edit, "/details");
        let body = json_body(operation, details)?;
        self.call(operation, Method::PATCH, &url, body).await
    }

    async fn upload_image(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        image_type: ImageType,
        content: Bytes,
    ) -> std::result::Result<(), GatewayError> {
        let url = self.upload_url(
            package,
            edit,
            &format!(
                "/listings/{}/{}",
                urlencoding::encode(language),
                image_type.as_str()
            ),
        );
        let body = Body::Binary {
            content_type: image_content_type(&content),
            content,
        };
        self.call_unit("edits.images.upload", Method::POST, &url, body)
            .await
    }

    async fn delete_images(
        &self,
        package: &PackageName,
        edit: &EditId,
        language: &str,
        image_type: ImageType,
    ) -> std::result::Result<usize, GatewayError> {
        let url = self.edit_url(
            package,
            edit,
            &format!(
                "/listings/{}/{}",
                urlencoding::encode(language),
                image_type.as_str()
            ),
        );
        let deleted: DeletedImages = self
            .call("edits.images.deleteall", Method::DELETE, &url, Body::Empty)
            .await?;
        Ok(deleted.deleted.len())
    }
}

#[async_trait]
impl MonetizationOps for HttpGateway {
    async fn update_data_safety(
        &self,
        package: &PackageName,
        csv: &str,
    ) -> std::result::Result<(), GatewayError> {
        let operation = "applications.dataSafety";
        let url = self.app_url(package, "/dataSafety");
        let body = json_body(operation, &serde_json::json!({ "safetyLabels": csv }))?;
        self.call_unit(operation, Method::POST, &url, body).await
    }

    async fn create_subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
        regions_version: Option<&str>,
        payload: &serde_json::Value,
    ) -> std::result::Result<Subscription, GatewayError> {
        let operation = "monetization.subscriptions.create";
        let tail = format!(
            "/subscriptions{}",
            query(&[
                ("productId", Some(product_id.as_str())),
                ("regionsVersion.version", regions_version),
            ])
        );
        let url = self.app_url(package, &tail);
        let body = json_body(operation, payload)?;
        self.call(operation, Method::POST, &url, body).await
    }

    async fn patch_subscription(
        &self,
        package: &PackageName,
        product_id: &ProductId,
        patch: &SubscriptionPatch,
        payload: &serde_json::Value,
    ) -> std::result::Result<Subscription, GatewayError> {
        let operation = "monetization.subscriptions.patch";
        let tail = format!(
            "/subscriptions/{}{}",
            urlencoding::encode(product_id.as_str()),
            query(&[
                ("regionsVersion.version", patch.regions_version.as_deref()),
                ("updateMask", patch.update_mask.as_deref()),
                ("allowMissing", patch.allow_missing.then_some("true")),
            ])
        );
        let url = self.app_url(package, &tail);
        let body = json_body(operation, payload)?;
        self.call(operation, Method::PATCH, &url, body).await
    }
}
