//! Error types for the fetcher, job store and worker.
//!
//! Resolver failures are not errors here: a failed probe is returned as
//! [`crate::resolver::Resolution::Failed`] so bulk resolution can keep going.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::JobId;

/// Failure of a single fetch. Nothing is retried inside the pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, connect, timeout, reset).
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// The server answered with a non-success status; the body was not kept.
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u32 },

    /// A 206 reply did not start where the side-file ends. The side-file is untouched.
    #[error("{url} answered 206 starting at {got:?}, expected byte {expected}")]
    UnexpectedRange {
        url: String,
        expected: u64,
        got: Option<u64>,
    },

    /// Computed digest differs from the expected one. The file stays at `path`.
    #[error("SHA-256 mismatch for {}: expected {expected}, got {computed}", path.display())]
    Integrity {
        expected: String,
        computed: String,
        path: PathBuf,
    },

    /// Local disk I/O failed (create dir, append, fsync, rename, read-back).
    #[error("storage error on {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller's abort token was set. The side-file keeps what was written.
    #[error("fetch of {url} aborted; partial data kept at {}", part_path.display())]
    Aborted { url: String, part_path: PathBuf },
}

impl FetchError {
    /// True for failures caused by the network or the remote side.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Transport { .. }
                | FetchError::Status { .. }
                | FetchError::UnexpectedRange { .. }
        )
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, FetchError::Integrity { .. })
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a job store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or initialized. No job was touched.
    #[error("job store unavailable at {}: {message}", path.display())]
    Unavailable { path: PathBuf, message: String },

    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    /// Bulk import source could not be read or parsed.
    #[error("failed to import {}: {message}", path.display())]
    Import { path: PathBuf, message: String },
}

/// Failure while processing a claimed job. The job stays claimed.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("job {id} has an unusable payload: {message}")]
    BadPayload { id: JobId, message: String },

    #[error("job {id}: could not derive a destination filename from {url}")]
    NoDestination { id: JobId, url: String },

    #[error("blocking transfer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
