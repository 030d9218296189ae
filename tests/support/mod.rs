// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup, fixture files, and in-memory gateway helpers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use trackctl::gateway::{MemoryGateway, Release, ReleaseStatus, Track};
use trackctl::types::PackageName;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("trackctl=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn package() -> PackageName {
    PackageName::new("com.example.app").unwrap()
}

#[allow(dead_code)]
pub fn gateway() -> Arc<MemoryGateway> {
    init_tracing();
    Arc::new(MemoryGateway::new())
}

/// Write a non-empty file named `name` into `dir`.
#[allow(dead_code)]
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[allow(dead_code)]
pub fn release(codes: &[i64], status: ReleaseStatus, fraction: Option<f64>) -> Release {
    Release {
        name: None,
        version_codes: codes.to_vec(),
        status,
        rollout_fraction: fraction,
        release_notes: vec![],
        country_targeting: None,
        in_app_update_priority: None,
    }
}

#[allow(dead_code)]
pub fn track(name: &str, releases: Vec<Release>) -> Track {
    Track::new(name, releases)
}
