//! `assetpipe checksum <path>`: SHA-256 of a local file.

use anyhow::Result;
use assetpipe_core::checksum;
use std::path::Path;

/// Compute and print SHA-256 of the given file, `sha256sum` style.
pub async fn run_checksum(path: &Path, chunk_size: usize) -> Result<()> {
    let owned = path.to_path_buf();
    let digest =
        tokio::task::spawn_blocking(move || checksum::sha256_path_chunked(&owned, chunk_size))
            .await??;
    println!("{}  {}", digest, path.display());
    Ok(())
}
