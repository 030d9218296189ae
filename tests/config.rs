// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, discovery, env overrides, and credential loading.

use std::time::Duration;
use trackctl::config::*;
use trackctl::error::Error;

mod parsing {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.default_language, "en-US");
        assert!(config.credentials.is_none());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.api.request_timeout, Duration::from_secs(600));
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
credentials: /secrets/play.json
default_language: de-DE
api:
  base_url: http://127.0.0.1:8080/androidpublisher/v3
  upload_base_url: http://127.0.0.1:8080/upload/androidpublisher/v3
  connect_timeout: 5s
  request_timeout: 20m
  ca_bundle: /etc/custom/ca.pem
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.credentials.as_deref(),
            Some(std::path::Path::new("/secrets/play.json"))
        );
        assert_eq!(config.default_language, "de-DE");
        assert_eq!(config.api.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.api.request_timeout, Duration::from_secs(1200));
        assert_eq!(
            config.api.ca_bundle.as_deref(),
            Some(std::path::Path::new("/etc/custom/ca.pem"))
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = Config::from_yaml("api:\n  base_url: ftp://example.com\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_yaml("api:\n  request_timeout: 0s\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn blank_language_is_rejected() {
        let err = Config::from_yaml("default_language: ''\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "default_language: fr-FR\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.default_language, "fr-FR");
    }

    #[test]
    fn finds_dot_directory_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".trackctl")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_DIR), "default_language: it-IT\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.default_language, "it-IT");
    }

    #[test]
    fn missing_config_is_reported_or_defaulted() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
        let config = Config::discover_or_default(dir.path()).unwrap();
        assert_eq!(config.default_language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn init_template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("keys/play.json"), false).unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(
            config.credentials.as_deref(),
            Some(std::path::Path::new("keys/play.json"))
        );
        assert!(matches!(
            init_config(dir.path(), None, false),
            Err(Error::AlreadyExists(_))
        ));
        init_config(dir.path(), None, true).unwrap();
    }
}

mod environment {
    use super::*;

    #[test]
    fn env_overrides_file_values() {
        temp_env::with_vars(
            [
                (ENV_CREDENTIALS, Some("/run/secrets/play.json")),
                (ENV_API_BASE_URL, Some("http://localhost:9000/v3")),
            ],
            || {
                let config = Config::from_yaml("credentials: file.json\n")
                    .unwrap()
                    .with_env_overrides();
                assert_eq!(
                    config.credentials.as_deref(),
                    Some(std::path::Path::new("/run/secrets/play.json"))
                );
                assert_eq!(config.api.base_url, "http://localhost:9000/v3");
            },
        );
    }

    #[test]
    fn empty_env_values_are_ignored() {
        temp_env::with_vars(
            [(ENV_CREDENTIALS, Some("")), (ENV_API_BASE_URL, Some("  "))],
            || {
                let config = Config::from_yaml("credentials: file.json\n")
                    .unwrap()
                    .with_env_overrides();
                assert_eq!(
                    config.credentials.as_deref(),
                    Some(std::path::Path::new("file.json"))
                );
                assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
            },
        );
    }
}

mod credentials {
    use super::*;

    #[test]
    fn no_credentials_configured_is_fatal() {
        temp_env::with_var_unset(ENV_CREDENTIALS, || {
            let config = Config::default().with_env_overrides();
            assert!(matches!(
                config.load_credentials(),
                Err(Error::MissingCredentials)
            ));
        });
    }

    #[test]
    fn malformed_credentials_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, "not json").unwrap();
        let config = Config {
            credentials: Some(path),
            ..Config::default()
        };

        match config.load_credentials() {
            Err(Error::Credentials(e)) => assert_eq!(e.kind(), CredentialsErrorKind::Malformed),
            other => panic!("expected credentials error, got {other:?}"),
        }
    }

    #[test]
    fn valid_credentials_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, r#"{"access_token":"ya29.abc"}"#).unwrap();
        let config = Config {
            credentials: Some(path),
            ..Config::default()
        };

        let creds = config.load_credentials().unwrap();
        assert_eq!(creds.access_token(), "ya29.abc");
        assert!(!format!("{creds:?}").contains("ya29"));
    }
}
