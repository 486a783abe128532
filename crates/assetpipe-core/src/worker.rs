//! Claim → resolve → fetch → complete.
//!
//! A worker drains the job store one job at a time. Blocking curl work runs on
//! `spawn_blocking`. Any failure leaves the job `claimed`; retry policy lives
//! outside this crate.
//!
//! The fetch goes to the payload URL, not the resolved one, so expiring signed
//! redirect targets are re-negotiated on every (resumed) attempt.

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::WorkerError;
use crate::fetcher::{FetchResult, Fetcher};
use crate::request::DownloadRequest;
use crate::resolver::{Resolution, Resolver};
use crate::store::{Job, JobId, JobStore};

/// What happened to one successfully processed job.
#[derive(Debug, Clone)]
pub struct WorkOutcome {
    pub job_id: JobId,
    pub resolution: Resolution,
    pub fetch: FetchResult,
}

/// Counts from [`Worker::run_until_idle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkSummary {
    pub completed: usize,
    pub failed: usize,
}

pub struct Worker {
    store: JobStore,
    resolver: Resolver,
    fetcher: Fetcher,
    downloads_dir: PathBuf,
}

impl Worker {
    pub fn new(store: JobStore, resolver: Resolver, fetcher: Fetcher, downloads_dir: PathBuf) -> Self {
        Self {
            store,
            resolver,
            fetcher,
            downloads_dir,
        }
    }

    /// Worker with resolver, fetcher and downloads dir taken from `cfg`.
    pub fn from_config(store: JobStore, cfg: &PipelineConfig) -> Self {
        Self::new(
            store,
            Resolver::new(cfg),
            Fetcher::new(cfg),
            cfg.downloads_dir(),
        )
    }

    /// Claim and process one job. `Ok(None)` means nothing was pending.
    pub async fn run_once(&self) -> Result<Option<WorkOutcome>, WorkerError> {
        let Some(job) = self.store.claim_next().await? else {
            return Ok(None);
        };
        let job_id = job.id;
        match self.process(job).await {
            Ok(outcome) => {
                self.store.complete(job_id).await?;
                tracing::info!(
                    job_id,
                    path = %outcome.fetch.path.display(),
                    digest = %outcome.fetch.local_digest,
                    "job done"
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "job failed; left claimed");
                Err(e)
            }
        }
    }

    /// Process jobs until none are pending. Failures are logged and counted, not returned;
    /// store errors while claiming still abort the loop.
    pub async fn run_until_idle(&self) -> Result<WorkSummary, WorkerError> {
        let mut summary = WorkSummary::default();
        loop {
            match self.run_once().await {
                Ok(Some(_)) => summary.completed += 1,
                Ok(None) => break,
                Err(WorkerError::Store(e)) => return Err(WorkerError::Store(e)),
                Err(_) => summary.failed += 1,
            }
        }
        tracing::info!(
            completed = summary.completed,
            failed = summary.failed,
            "worker idle"
        );
        Ok(summary)
    }

    async fn process(&self, job: Job) -> Result<WorkOutcome, WorkerError> {
        let request = DownloadRequest::from_payload(&job.payload).map_err(|e| WorkerError::BadPayload {
            id: job.id,
            message: e.to_string(),
        })?;

        let resolver = self.resolver.clone();
        let resolution = tokio::task::spawn_blocking({
            let url = request.url.clone();
            let headers = request.headers.clone();
            move || resolver.resolve(&url, &headers)
        })
        .await?;

        match &resolution {
            Resolution::Resolved(r) => tracing::debug!(
                job_id = job.id,
                final_url = %r.final_url,
                status = r.status_code,
                server_digest = ?r.server_digest,
                "resolved"
            ),
            Resolution::Failed(f) => {
                tracing::warn!(job_id = job.id, error = %f.message, "resolve failed, attempting fetch anyway")
            }
        }

        let dest = request
            .destination(&self.downloads_dir, &request.url)
            .ok_or_else(|| WorkerError::NoDestination {
                id: job.id,
                url: request.url.clone(),
            })?;

        let fetcher = self.fetcher.clone();
        let fetch = tokio::task::spawn_blocking(move || {
            fetcher.fetch(
                &request.url,
                &dest,
                &request.headers,
                request.expected_digest.as_deref(),
            )
        })
        .await??;

        Ok(WorkOutcome {
            job_id: job.id,
            resolution,
            fetch,
        })
    }
}
