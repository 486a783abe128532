//! `assetpipe fetch <url> <dest>`: one-off resumable download outside the queue.

use anyhow::Result;
use assetpipe_core::config::PipelineConfig;
use assetpipe_core::fetcher::Fetcher;
use std::collections::HashMap;
use std::path::PathBuf;

pub async fn run_fetch(
    cfg: &PipelineConfig,
    url: String,
    dest: PathBuf,
    sha256: Option<String>,
    headers: HashMap<String, String>,
) -> Result<()> {
    let fetcher = Fetcher::new(cfg);
    let result = tokio::task::spawn_blocking(move || {
        fetcher.fetch(&url, &dest, &headers, sha256.as_deref())
    })
    .await??;
    if result.resumed_from > 0 {
        println!(
            "Resumed from byte {} of {}",
            result.resumed_from, result.bytes
        );
    }
    println!("{}  {}", result.local_digest, result.path.display());
    Ok(())
}
