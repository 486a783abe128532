//! Logging init: a log file under the pipeline root's `state/` directory
//! (next to the job database), or stderr when that is not writable.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::Path;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;

/// sqlx logs every statement at info; only its warnings are worth keeping.
const DEFAULT_FILTER: &str = "info,assetpipe=debug,assetpipe_core=debug,sqlx=warn";

/// Shares one append-mode handle across events; `&File` is itself a writer.
struct LogFile(File);

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = &'a File;

    fn make_writer(&'a self) -> Self::Writer {
        &self.0
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to [`PipelineConfig::log_path`]. Errors if the file cannot be opened or a
/// subscriber is already installed; callers fall back to [`init_logging_stderr`].
pub fn init_logging(cfg: &PipelineConfig) -> Result<()> {
    init_logging_at(&cfg.log_path())
}

/// Log to an explicit file, creating its directory.
pub fn init_logging_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating log dir {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(LogFile(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(path = %path.display(), "assetpipe logging initialized");
    Ok(())
}

pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }
}
