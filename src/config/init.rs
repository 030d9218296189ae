// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates trackctl.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, credentials: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();
    if let Some(path) = credentials {
        if path.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "credentials path cannot be empty".to_string(),
            ));
        }
        config.credentials = Some(path.into());
    }

    std::fs::write(&config_path, generate_template_yaml(&config))?;
    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let credentials = config
        .credentials
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    format!(
        r#"# JSON file with an OAuth access_token for the publisher API
credentials: {credentials}
default_language: {language}
api:
  connect_timeout: {connect}
  # Large bundle uploads can take a while
  request_timeout: {request}
  # base_url: {base_url}
  # PEM roots to trust instead of the bundled webpki roots
  # ca_bundle: /etc/ssl/certs/ca-certificates.crt
"#,
        language = config.default_language,
        connect = humantime_serde::re::humantime::format_duration(config.api.connect_timeout),
        request = humantime_serde::re::humantime::format_duration(config.api.request_timeout),
        base_url = config.api.base_url,
    )
}
