use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "palaver_core=info,palaver_tui=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env("PALAVER_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("palaver").join("palaver.log"))
}

/// Send tracing output to a file. The widget owns the terminal, so nothing
/// may be written to stdout/stderr while it runs. Returns the log path, or
/// `None` when the file couldn't be opened and logging stays off.
pub fn init_file(log_file: Option<PathBuf>) -> Option<PathBuf> {
    let log_path = log_file.or_else(default_log_path)?;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).ok()?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok()?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .try_init()
        .ok()?;

    tracing::info!(path = ?log_path, "tracing initialized");
    Some(log_path)
}

/// Plain stderr logging for the one-shot commands
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PALAVER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
