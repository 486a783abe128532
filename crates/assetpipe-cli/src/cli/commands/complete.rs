//! `assetpipe complete <id>`: mark a claimed job done by hand.

use anyhow::Result;
use assetpipe_core::store::{JobId, JobStore};

pub async fn run_complete(store: &JobStore, id: JobId) -> Result<()> {
    if store.complete(id).await? {
        println!("Job {id} marked done.");
    } else {
        let state = store
            .get(id)
            .await?
            .map(|j| j.state.to_string())
            .unwrap_or_default();
        println!("Job {id} left unchanged ({state}).");
    }
    Ok(())
}
