//! `assetpipe resolve <url>...`: probe without downloading, print JSON.

use anyhow::Result;
use assetpipe_core::config::PipelineConfig;
use assetpipe_core::resolver::Resolver;
use std::collections::HashMap;

pub async fn run_resolve(
    cfg: &PipelineConfig,
    urls: Vec<String>,
    headers: HashMap<String, String>,
) -> Result<()> {
    let resolver = Resolver::new(cfg);
    let results =
        tokio::task::spawn_blocking(move || resolver.resolve_all(&urls, &headers)).await?;
    let failed = results.iter().filter(|r| !r.is_resolved()).count();
    println!("{}", serde_json::to_string_pretty(&results)?);
    if failed > 0 {
        tracing::warn!(failed, "some URLs could not be resolved");
    }
    Ok(())
}
