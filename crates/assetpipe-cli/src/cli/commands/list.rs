//! `assetpipe list`: show jobs and their states.

use anyhow::Result;
use assetpipe_core::store::{JobState, JobStore};

pub async fn run_list(store: &JobStore, state: Option<JobState>) -> Result<()> {
    let jobs = store.list(state).await?;
    if jobs.is_empty() {
        println!("No jobs in store.");
        return Ok(());
    }
    println!("{:<6} {:<8} {}", "ID", "STATE", "PAYLOAD");
    for j in jobs {
        // Prefer the URL when the payload has one; otherwise show the raw JSON.
        let summary = j
            .payload
            .get("url")
            .and_then(|u| u.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| j.payload.to_string());
        println!("{:<6} {:<8} {}", j.id, j.state, summary);
    }
    Ok(())
}
