//! `assetpipe import <path>`: bulk-enqueue a queue document.

use anyhow::Result;
use assetpipe_core::store::JobStore;
use std::path::Path;

pub async fn run_import(store: &JobStore, path: &Path) -> Result<()> {
    let n = store.import_bulk(path).await?;
    if n == 0 {
        println!("Nothing to import from {}.", path.display());
    } else {
        println!("Imported {n} job(s) from {}.", path.display());
    }
    Ok(())
}
