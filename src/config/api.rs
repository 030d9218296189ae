// ABOUTME: Remote API endpoint and transport settings.
// ABOUTME: Base URLs, timeouts, and an optional CA bundle used to verify TLS peers.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";
pub const DEFAULT_UPLOAD_BASE_URL: &str =
    "https://androidpublisher.googleapis.com/upload/androidpublisher/v3";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Whole-request timeout. Generous because binary uploads can be large.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// PEM roots to trust. The bundled webpki roots are used when unset.
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_upload_base_url() -> String {
    DEFAULT_UPLOAD_BASE_URL.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(600)
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            upload_base_url: default_upload_base_url(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            ca_bundle: None,
        }
    }
}

impl ApiConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("api.base_url", &self.base_url),
            ("api.upload_base_url", &self.upload_base_url),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(Error::InvalidConfig(format!(
                    "{field} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "api timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
