//! Tracing setup
//!
//! Logs go to a file because stdout and stdin belong to the launched server.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install a JSON subscriber writing to `log_path`.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn init(log_path: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .with_context(|| format!("Log path {:?} has no file name", log_path))?;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}
