//! Diagnostic events emitted by scans and moves.
//!
//! The engine never logs directly: it reports through a [`DiagnosticSink`]
//! handed in via [`crate::SweepContext`]. [`TracingSink`] forwards to
//! `tracing`; [`CollectingSink`] keeps events in memory.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::archive::{ArchiveSummary, SchedulePolicy};
use crate::model::ScanSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    ManifestsDiscovered { root: PathBuf, count: usize },
    ManifestSkipped { path: PathBuf, reason: String },
    IndexBuilt { names: usize, conflicting: usize },
    ConflictingDeclaration { name: String, manifests: Vec<PathBuf> },
    DirectorySkipped { path: PathBuf, reason: String },
    ScanCompleted(ScanSummary),
    ReportSaved { path: PathBuf, rows: usize },
    ScheduleChosen { policy: SchedulePolicy, candidates: usize, mean_size: Option<u64> },
    FileMoved { from: PathBuf, to: PathBuf },
    SourceVanished { path: PathBuf },
    ForeignPathSkipped { path: PathBuf },
    MoveFailed { path: PathBuf, reason: String },
    ArchiveCompleted(ArchiveSummary),
}

/// Receiver for engine diagnostics. Called from worker threads during
/// concurrent moves.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: Diagnostic);
}

/// Forwards every event to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: Diagnostic) {
        match event {
            Diagnostic::ManifestsDiscovered { root, count } => {
                info!(root = %root.display(), count, "Discovered manifest files");
            }
            Diagnostic::ManifestSkipped { path, reason } => {
                error!(manifest = %path.display(), error = %reason, "Skipping manifest");
            }
            Diagnostic::IndexBuilt { names, conflicting } => {
                info!(names, conflicting, "Extracted manifest metadata");
            }
            Diagnostic::ConflictingDeclaration { name, manifests } => {
                let last = manifests.last().map(|p| p.display().to_string()).unwrap_or_default();
                warn!(
                    artifact = %name,
                    manifests = manifests.len(),
                    linked = %last,
                    "Artifact declared by several manifests; linking the last one"
                );
            }
            Diagnostic::DirectorySkipped { path, reason } => {
                warn!(dir = %path.display(), error = %reason, "Failed to read directory during scan");
            }
            Diagnostic::ScanCompleted(s) => {
                info!(
                    artifacts = s.artifacts,
                    used = s.used,
                    unused = s.unused,
                    missing = s.missing,
                    "Scan completed"
                );
            }
            Diagnostic::ReportSaved { path, rows } => {
                info!(report = %path.display(), rows, "Saved report");
            }
            Diagnostic::ScheduleChosen { policy, candidates, mean_size } => {
                info!(%policy, candidates, mean_size = ?mean_size, "Chose move schedule");
            }
            Diagnostic::FileMoved { from, to } => {
                info!(from = %from.display(), to = %to.display(), "Moved to archive");
            }
            Diagnostic::SourceVanished { path } => {
                info!(path = %path.display(), "Source no longer exists; skipping");
            }
            Diagnostic::ForeignPathSkipped { path } => {
                warn!(path = %path.display(), "Report row outside the scanned root; skipping");
            }
            Diagnostic::MoveFailed { path, reason } => {
                error!(path = %path.display(), error = %reason, "Failed to move file");
            }
            Diagnostic::ArchiveCompleted(s) => {
                info!(
                    candidates = s.candidates,
                    moved = s.moved,
                    skipped_missing = s.skipped_missing,
                    skipped_foreign = s.skipped_foreign,
                    failed = s.failed,
                    "Archive completed"
                );
            }
        }
    }
}

/// Keeps events in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, event: Diagnostic) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
