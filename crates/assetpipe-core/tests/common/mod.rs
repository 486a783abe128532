#![allow(dead_code)]

pub mod asset_server;

use assetpipe_core::config::PipelineConfig;
use sha2::{Digest, Sha256};

/// Deterministic test body of `len` bytes.
pub fn body(len: usize) -> Vec<u8> {
    (0u8..251).cycle().take(len).collect()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Config rooted in `root` with short timeouts and a small chunk so tests cross chunk boundaries.
pub fn test_config(root: &std::path::Path) -> PipelineConfig {
    let mut cfg = PipelineConfig::with_root(root);
    cfg.probe_timeout_secs = 5;
    cfg.transfer_timeout_secs = 5;
    cfg.chunk_size = 4096;
    cfg
}
