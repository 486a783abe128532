//! Caller-side view of a job payload: what to download and how to verify it.
//!
//! The store treats payloads as opaque JSON; this is how the worker reads one.
//! Unknown fields are kept so a payload round-trips unchanged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Hex SHA-256 the downloaded file must match.
    #[serde(
        default,
        rename = "expectedDigest",
        alias = "expected_digest",
        alias = "sha256",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_digest: Option<String>,
    /// Destination; relative paths are taken against the downloads directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,
    /// Extra request headers (e.g. `Authorization`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expected_digest: None,
            dest: None,
            headers: HashMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_expected_digest(mut self, digest: impl Into<String>) -> Self {
        self.expected_digest = Some(digest.into());
        self
    }

    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(payload)
    }

    pub fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Where the asset should land: the explicit `dest` (joined onto
    /// `downloads_dir` when relative) or the last path segment of `url`.
    pub fn destination(&self, downloads_dir: &Path, url: &str) -> Option<PathBuf> {
        match &self.dest {
            Some(dest) if dest.is_absolute() => Some(dest.clone()),
            Some(dest) => Some(downloads_dir.join(dest)),
            None => filename_from_url_path(url).map(|name| downloads_dir.join(name)),
        }
    }
}

/// Extracts the last path segment from a URL for use as a filename.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
