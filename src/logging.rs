use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

const LOG_ENV: &str = "SMARTDOC_LOG";

/// `<data dir>/smartdoc/logs`, or the temp dir when there is no data dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("smartdoc")
        .join("logs")
}

/// Logs go to a daily file; the terminal itself belongs to the UI.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn configure_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, "smartdoc.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false);

    Registry::default().with(filter).with(file_log).try_init()?;

    Ok(guard)
}
