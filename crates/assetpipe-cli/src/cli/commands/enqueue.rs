//! `assetpipe enqueue <url>`: queue one download job.

use anyhow::Result;
use assetpipe_core::request::DownloadRequest;
use assetpipe_core::store::JobStore;
use std::path::PathBuf;

pub async fn run_enqueue(
    store: &JobStore,
    url: &str,
    sha256: Option<String>,
    dest: Option<PathBuf>,
) -> Result<()> {
    let mut request = DownloadRequest::new(url);
    if let Some(digest) = sha256 {
        request = request.with_expected_digest(digest);
    }
    if let Some(dest) = dest {
        request = request.with_dest(dest);
    }
    let id = store.enqueue(&request.to_payload()?).await?;
    println!("Enqueued job {id} for URL: {url}");
    Ok(())
}
