use std::path::PathBuf;

use thiserror::Error;

/// Structural failures. These abort the operation and propagate to the caller.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty extension, zero workers, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Scan root is missing, unreadable, or not a directory.
    #[error("scan root is not a readable directory: {}", .0.display())]
    InvalidRoot(PathBuf),
    /// Move requested before any scan wrote a report.
    #[error("no report at {}: run a scan first", .0.display())]
    NoPriorScan(PathBuf),
    /// Report exists but does not match the six-column schema.
    #[error("report {} is corrupt: {reason}", path.display())]
    ReportCorrupt { path: PathBuf, reason: String },
    /// Report could not be read or written.
    #[error("report {}: {source}", path.display())]
    ReportIo {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Archive root could not be created or is not a directory.
    #[error("archive root {}: {reason}", path.display())]
    ArchiveRoot { path: PathBuf, reason: String },
}

/// Failure to read one manifest. Recovered: the manifest is skipped.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed manifest {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failure to move one file. Recovered: the batch continues.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("destination {} already exists", .0.display())]
    DestinationExists(PathBuf),
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
    #[error("cannot move {} to {}: {source}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}
