//! Logging setup for the CLI.
//!
//! Installs a global tracing subscriber that writes human-readable events to
//! stderr (stdout stays reserved for `--json` output) and, when `--log-file`
//! is given, mirrors them without ANSI colours into that file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "info";

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file path has no file name component.
    #[error("log file path has no file name: {0}")]
    NoFileName(PathBuf),
    /// Failed to create the directory holding the log file.
    #[error("failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create or open the log file.
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to set the global tracing subscriber.
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing. Keep the returned guard alive until exit so buffered
/// file output is flushed.
pub fn init(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Some(path) = log_file else {
        let subscriber = Registry::default().with(build_env_filter()).with(stderr_layer);
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(None);
    };

    let (dir, name) = split_log_path(path)?;
    fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    ensure_file_exists(path)?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, name));
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);

    let subscriber = Registry::default()
        .with(build_env_filter())
        .with(stderr_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(path = %path.display(), "file logging enabled");
    Ok(Some(guard))
}

fn split_log_path(path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| LoggingError::NoFileName(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name))
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
