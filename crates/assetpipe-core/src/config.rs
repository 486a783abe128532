use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::checksum::DEFAULT_CHUNK_SIZE;

/// Pipeline configuration loaded from `~/.config/assetpipe/config.toml`.
///
/// Passed explicitly to the resolver, fetcher, job store and worker; nothing in
/// the core reads process-wide state on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Storage root. The job database and downloaded assets live below it.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Timeout for metadata probes (HEAD and the header-only GET fallback).
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Connect timeout and stall timeout for streaming transfers.
    #[serde(default = "default_transfer_timeout_secs")]
    pub transfer_timeout_secs: u64,
    /// Write chunk for streaming and read chunk for digesting, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Maximum redirects followed by probes and transfers.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

fn default_root() -> PathBuf {
    xdg::BaseDirectories::with_prefix("assetpipe")
        .map(|d| d.get_data_home().join("assetpipe"))
        .unwrap_or_else(|_| PathBuf::from("assetpipe"))
}

fn default_probe_timeout_secs() -> u64 {
    15
}

fn default_transfer_timeout_secs() -> u64 {
    60
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_redirects() -> u32 {
    10
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            probe_timeout_secs: default_probe_timeout_secs(),
            transfer_timeout_secs: default_transfer_timeout_secs(),
            chunk_size: default_chunk_size(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl PipelineConfig {
    /// Default settings rooted at `root`. Used by tests and `--root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// `root/state/queue.db`
    pub fn db_path(&self) -> PathBuf {
        self.root.join("state").join("queue.db")
    }

    /// `root/state/assetpipe.log`, next to the job database.
    pub fn log_path(&self) -> PathBuf {
        self.root.join("state").join("assetpipe.log")
    }

    /// Default directory for fetched assets: `root/models`.
    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("assetpipe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PipelineConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit config file path.
pub fn load_or_init_at(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        let default_cfg = PipelineConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: PipelineConfig = toml::from_str(&data)?;
    Ok(cfg)
}
