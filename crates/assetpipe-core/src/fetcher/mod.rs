//! Resumable streaming download with SHA-256 verification.
//!
//! The body is appended to `<dest>.part`; a restarted fetch resumes with a
//! Range request from the side-file's length. Once the stream completes the
//! side-file is fsynced and renamed onto `dest`, and the digest is computed by
//! reading the final file back. On a digest mismatch the file stays in place.

mod stream;

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::checksum;
use crate::config::PipelineConfig;
use crate::error::FetchError;
use crate::storage::{self, PartFile};
use stream::StreamOutcome;

/// A completed, verified (when requested) download.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    /// Absolute path of the final file.
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the final file.
    pub local_digest: String,
    /// Size of the final file.
    pub bytes: u64,
    /// Offset the downloaded content continues from (0 for a fresh or restarted download).
    pub resumed_from: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct TransferSettings {
    pub(crate) timeout: Duration,
    pub(crate) max_redirects: u32,
}

/// Blocking fetcher. Call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct Fetcher {
    chunk_size: usize,
    settings: TransferSettings,
    abort: Option<Arc<AtomicBool>>,
}

impl Fetcher {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            chunk_size: cfg.chunk_size,
            settings: TransferSettings {
                timeout: cfg.transfer_timeout(),
                max_redirects: cfg.max_redirects,
            },
            abort: None,
        }
    }

    /// Stop transfers once `token` is set; the side-file is kept for a later resume.
    pub fn with_abort_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.abort = Some(token);
        self
    }

    /// Download `url` to `dest`, verifying against `expected_digest` (hex SHA-256) when given.
    pub fn fetch(
        &self,
        url: &str,
        dest: &Path,
        custom_headers: &HashMap<String, String>,
        expected_digest: Option<&str>,
    ) -> Result<FetchResult, FetchError> {
        let dest = std::path::absolute(dest).map_err(|e| FetchError::storage(dest, e))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FetchError::storage(parent, e))?;
        }

        let part_path = storage::temp_path(&dest);
        let part = PartFile::open_append(&part_path, self.chunk_size)
            .map_err(|e| FetchError::storage(&part_path, e))?;

        let abort = self.abort.as_deref();
        let (mut part, mut report) =
            stream::stream_to_part(url, custom_headers, part, &self.settings, abort)?;
        if report.outcome == StreamOutcome::Truncated {
            // The side-file is empty now, so this request carries no Range.
            (part, report) = stream::stream_to_part(url, custom_headers, part, &self.settings, abort)?;
        }
        let resumed_from = report.started_from;
        let bytes = part.len();

        part.sync().map_err(|e| FetchError::storage(&part_path, e))?;
        part.finalize(&dest)
            .map_err(|e| FetchError::storage(&dest, e))?;
        tracing::info!(
            url,
            path = %dest.display(),
            bytes,
            resumed_from,
            already_complete = report.outcome == StreamOutcome::AlreadyComplete,
            "download complete"
        );

        let local_digest = checksum::sha256_path_chunked(&dest, self.chunk_size)
            .map_err(|e| FetchError::storage(&dest, e))?;

        if let Some(expected) = expected_digest {
            if !checksum::digests_match(expected, &local_digest) {
                tracing::error!(
                    url,
                    path = %dest.display(),
                    expected,
                    computed = %local_digest,
                    "digest mismatch; file kept for inspection"
                );
                return Err(FetchError::Integrity {
                    expected: expected.to_string(),
                    computed: local_digest,
                    path: dest,
                });
            }
            tracing::debug!(url, digest = %local_digest, "digest verified");
        }

        Ok(FetchResult {
            path: dest,
            local_digest,
            bytes,
            resumed_from,
        })
    }
}
