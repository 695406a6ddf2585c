//! File-based logging setup.
//!
//! The TUI owns the terminal, so log output goes to
//! `${TAV_HOME}/logs/tav.log` instead of stdout/stderr. The filter is
//! controlled by the `TAV_LOG` environment variable (e.g. `TAV_LOG=debug`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber writing to `dir/tav.log`.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so
/// the caller must keep it alive for the lifetime of the process.
pub fn init(dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, "tav.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("TAV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(guard)
}
