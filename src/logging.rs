//! File logging. The terminal belongs to the UI, so nothing is logged to it.
//!
//! Filtering follows `RUST_LOG` (e.g. `RUST_LOG=cfgsheet=debug`) and
//! defaults to `info`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cfgsheet")
        .join("cfgsheet.log")
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines get flushed.
pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    let dir = log_file.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file_name = log_file
        .file_name()
        .context("log path has no file name")?;

    let appender = tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
