// ABOUTME: Local file access for artifacts, images, CSVs, and payloads.
// ABOUTME: Maps missing files to ResourceNotFound and picks the upload format.

use bytes::Bytes;
use std::fmt;
use std::path::Path;

use super::PublishError;

/// How a binary artifact is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// App bundle (`.aab`).
    Bundle,
    /// Single installable package (anything else).
    Package,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("aab") => ArtifactFormat::Bundle,
            _ => ArtifactFormat::Package,
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactFormat::Bundle => write!(f, "bundle"),
            ArtifactFormat::Package => write!(f, "package"),
        }
    }
}

/// Read a local file, reporting a missing or non-regular file as `ResourceNotFound`.
pub async fn read_local_file(path: &Path) -> Result<Bytes, PublishError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(PublishError::ResourceNotFound(path.to_path_buf())),
    }

    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| PublishError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a local UTF-8 text file.
pub async fn read_local_text(path: &Path) -> Result<String, PublishError> {
    let bytes = read_local_file(path).await?;
    String::from_utf8(bytes.to_vec()).map_err(|e| PublishError::Read {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}
