//! CLI for the assetpipe acquisition pipeline.

mod commands;

use anyhow::Result;
use assetpipe_core::config::{self, PipelineConfig};
use assetpipe_core::logging;
use assetpipe_core::store::{JobId, JobState, JobStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    run_checksum, run_complete, run_enqueue, run_fetch, run_import, run_list, run_resolve,
    run_work,
};

/// Top-level CLI for assetpipe.
#[derive(Debug, Parser)]
#[command(name = "assetpipe")]
#[command(about = "assetpipe: resolve, fetch and verify model assets from a durable job queue", long_about = None)]
pub struct Cli {
    /// Pipeline root (overrides `root` from the config file).
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Queue a download job for a URL.
    Enqueue {
        /// Direct HTTP/HTTPS URL of the asset.
        url: String,
        /// Expected SHA-256 (hex) of the downloaded file.
        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,
        /// Destination path; relative paths land under the downloads directory.
        #[arg(long, value_name = "PATH")]
        dest: Option<PathBuf>,
    },

    /// Import jobs from a `{ "queue": [...] }` JSON document.
    Import {
        /// Path to the JSON document.
        path: PathBuf,
    },

    /// List jobs, optionally filtered by state.
    List {
        /// pending, claimed or done.
        #[arg(long)]
        state: Option<JobState>,
    },

    /// Mark a claimed job done.
    Complete {
        /// Job identifier.
        id: JobId,
    },

    /// Probe URLs for final location, size and server digest (prints JSON).
    Resolve {
        /// One or more URLs.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Extra request header, `Name: value`. Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// Download one URL to a path, resuming from `<dest>.part` if present.
    Fetch {
        url: String,
        dest: PathBuf,
        /// Expected SHA-256 (hex).
        #[arg(long, value_name = "HEX")]
        sha256: Option<String>,
        /// Extra request header, `Name: value`. Repeatable.
        #[arg(short = 'H', long = "header", value_name = "HEADER", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// Process queued jobs until none are pending.
    Work {
        /// Process at most one job.
        #[arg(long)]
        once: bool,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

/// `Name: value` → `(Name, value)`.
fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("header '{s}' must look like 'Name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header '{s}' has an empty name"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load_config(root: Option<PathBuf>) -> Result<PipelineConfig> {
    let mut cfg = config::load_or_init()?;
    if let Some(root) = root {
        cfg.root = root;
    }
    Ok(cfg)
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.root)?;
        if let Err(e) = logging::init_logging(&cfg) {
            logging::init_logging_stderr();
            tracing::warn!("file logging unavailable ({e:#}), logging to stderr");
        }
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Enqueue { url, sha256, dest } => {
                let store = JobStore::open(&cfg).await?;
                run_enqueue(&store, &url, sha256, dest).await?;
            }
            CliCommand::Import { path } => {
                let store = JobStore::open(&cfg).await?;
                run_import(&store, &path).await?;
            }
            CliCommand::List { state } => {
                let store = JobStore::open(&cfg).await?;
                run_list(&store, state).await?;
            }
            CliCommand::Complete { id } => {
                let store = JobStore::open(&cfg).await?;
                run_complete(&store, id).await?;
            }
            CliCommand::Resolve { urls, headers } => {
                run_resolve(&cfg, urls, headers.into_iter().collect()).await?
            }
            CliCommand::Fetch {
                url,
                dest,
                sha256,
                headers,
            } => run_fetch(&cfg, url, dest, sha256, headers.into_iter().collect()).await?,
            CliCommand::Work { once } => {
                let store = JobStore::open(&cfg).await?;
                run_work(store, &cfg, once).await?;
            }
            CliCommand::Checksum { path } => run_checksum(&path, cfg.chunk_size).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
