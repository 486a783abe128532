//! `assetpipe work`: drain the job queue.

use anyhow::Result;
use assetpipe_core::config::PipelineConfig;
use assetpipe_core::store::JobStore;
use assetpipe_core::worker::Worker;

pub async fn run_work(store: JobStore, cfg: &PipelineConfig, once: bool) -> Result<()> {
    let worker = Worker::from_config(store, cfg);

    if once {
        match worker.run_once().await? {
            Some(outcome) => println!(
                "Job {} done: {}  {}",
                outcome.job_id,
                outcome.fetch.local_digest,
                outcome.fetch.path.display()
            ),
            None => println!("No pending jobs."),
        }
        return Ok(());
    }

    let summary = worker.run_until_idle().await?;
    println!(
        "Completed {} job(s), {} failed (left claimed).",
        summary.completed, summary.failed
    );
    if summary.failed > 0 {
        anyhow::bail!("{} job(s) failed", summary.failed);
    }
    Ok(())
}
