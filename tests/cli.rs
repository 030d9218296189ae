// ABOUTME: Integration tests for the trackctl CLI commands.
// ABOUTME: Validates --help output, init, and dry-run command behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn trackctl_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("trackctl"));
    cmd.env_remove("TRACKCTL_CREDENTIALS")
        .env_remove("TRACKCTL_API_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_shows_commands() {
    trackctl_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("promote"))
        .stdout(predicate::str::contains("releases"))
        .stdout(predicate::str::contains("subscription"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("trackctl.yml");

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--credentials", "play-credentials.json"])
        .assert()
        .success();

    assert!(config_path.exists(), "trackctl.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("credentials: play-credentials.json"));
    assert!(content.contains("default_language: en-US"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("trackctl.yml");

    fs::write(&config_path, "existing: config").unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert_eq!(content, "existing: config");
}

#[test]
fn missing_credentials_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args(["releases", "--package", "com.example.app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credentials configured"));
}

#[test]
fn invalid_package_name_is_rejected() {
    trackctl_cmd()
        .args(["--dry-run", "releases", "--package", "example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least two segments"));
}

#[test]
fn dry_run_deploy_succeeds() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("app.aab"), b"bundle").unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args([
            "--dry-run",
            "deploy",
            "--package",
            "com.example.app",
            "--track",
            "beta",
            "--artifact",
            "app.aab",
            "--version-code",
            "42",
            "--rollout",
            "0.25",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("deployed version 42 to beta"));
}

#[test]
fn dry_run_deploy_json_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("app.apk"), b"package").unwrap();

    let assert = trackctl_cmd()
        .current_dir(temp_dir.path())
        .args([
            "--dry-run",
            "--json",
            "deploy",
            "-p",
            "com.example.app",
            "-t",
            "internal",
            "-a",
            "app.apk",
            "--version-code",
            "7",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let event: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(event["event"], "success");
    assert_eq!(event["result"]["success"], true);
    assert_eq!(event["result"]["track"], "internal");
    assert_eq!(event["result"]["versionCode"], 7);
    assert!(event["result"]["deploymentId"].is_string());
}

#[test]
fn dry_run_missing_artifact_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args([
            "--dry-run",
            "deploy",
            "-p",
            "com.example.app",
            "-t",
            "beta",
            "-a",
            "missing.aab",
            "--version-code",
            "42",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn dry_run_promote_of_unknown_version_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args([
            "--dry-run",
            "promote",
            "-p",
            "com.example.app",
            "--from",
            "alpha",
            "--to",
            "production",
            "--version-code",
            "99",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn listing_without_fields_is_an_invalid_request() {
    let temp_dir = tempfile::tempdir().unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args(["--dry-run", "listing", "-p", "com.example.app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid request"));
}

#[test]
fn dry_run_subscription_create_from_inline_body() {
    let temp_dir = tempfile::tempdir().unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args([
            "--dry-run",
            "subscription",
            "create",
            "-p",
            "com.example.app",
            "--product-id",
            "premium",
            "--body",
            r#"{"basePlans": [{"basePlanId": "monthly"}]}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "created subscription premium for com.example.app",
        ));
}

#[test]
fn subscription_body_and_payload_file_conflict() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("sub.json"), "{}").unwrap();

    trackctl_cmd()
        .current_dir(temp_dir.path())
        .args([
            "--dry-run",
            "subscription",
            "update",
            "-p",
            "com.example.app",
            "--product-id",
            "premium",
            "--allow-missing",
            "--body",
            "{}",
            "sub.json",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn subscription_body_must_be_json() {
    trackctl_cmd()
        .args([
            "--dry-run",
            "subscription",
            "create",
            "-p",
            "com.example.app",
            "--product-id",
            "premium",
            "--body",
            "not json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}
