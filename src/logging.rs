use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::data_dir;

/// Log to a daily file under the data dir; the terminal belongs to the UI.
///
/// `RUST_LOG` takes precedence over `level`. Keep the guard alive until exit.
pub fn init(level: Option<&str>) -> Result<WorkerGuard> {
    let dir = data_dir().join("logs");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log dir {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, "nexus.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;

    Ok(guard)
}
