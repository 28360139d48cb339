//! Durable report storage: one CSV row per [`ReportRow`].

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::ReconError;
use crate::model::{ArtifactStatus, ReportRow, NOT_AVAILABLE};

/// Column order of the report file.
pub const HEADERS: [&str; 6] = [
    "File Path",
    "File Name",
    "Creation Date",
    "Status",
    "Manifest File",
    "Resolved Manifest Path",
];

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local time as `YYYY-MM-DD HH:MM:SS`, or `N/A` when absent.
pub fn format_creation(created: Option<SystemTime>) -> String {
    match created {
        Some(t) => DateTime::<Local>::from(t).format(DATE_FORMAT).to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Write all rows to `target`, replacing any previous report atomically.
///
/// Rows go to a temporary file next to `target` which is then renamed over
/// it, so a failed write never leaves a truncated report behind.
pub fn save(rows: &[ReportRow], target: &Path) -> Result<(), ReconError> {
    let io_err = |source: io::Error| ReconError::ReportIo {
        path: target.to_path_buf(),
        source,
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_err)?;
    if target.is_dir() {
        return Err(io_err(io::Error::other("target is a directory")));
    }

    let tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file());
        writer.write_record(HEADERS).map_err(|e| io_err(e.into()))?;
        for row in rows {
            writer.serialize(row).map_err(|e| io_err(e.into()))?;
        }
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(target).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Read a report back. `Ok(None)` when no report exists at `target`.
pub fn load(target: &Path) -> Result<Option<Vec<ReportRow>>, ReconError> {
    let corrupt = |reason: String| ReconError::ReportCorrupt {
        path: target.to_path_buf(),
        reason,
    };

    if target.is_dir() {
        return Err(corrupt("target is a directory".into()));
    }
    let file = match File::open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ReconError::ReportIo {
                path: target.to_path_buf(),
                source,
            })
        }
    };

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| corrupt(format!("cannot read header: {e}")))?;
    if !headers.iter().eq(HEADERS.iter().copied()) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(corrupt(format!("unexpected header {found:?}")));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<ReportRow>().enumerate() {
        // Line 1 is the header.
        let row = record.map_err(|e| corrupt(format!("line {}: {e}", i + 2)))?;
        rows.push(row);
    }
    Ok(Some(rows))
}

/// Rows with the given status, or all rows for `None`.
pub fn filter_by_status(rows: &[ReportRow], status: Option<ArtifactStatus>) -> Vec<&ReportRow> {
    rows.iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .collect()
}
