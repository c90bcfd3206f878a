use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::AppResult;

pub const LOG_FILE_NAME: &str = "gia.log";

/// Default log directory, under the platform's local data directory.
pub fn default_log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gia").map(|dirs| dirs.data_local_dir().join("logs"))
}

/// Routes tracing output to `<dir>/gia.log`; the terminal belongs to the UI.
///
/// The returned guard flushes the writer when dropped and must outlive the
/// application.
pub fn init(dir: &Path) -> AppResult<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}
