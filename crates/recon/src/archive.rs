//! Relocating Unused artifacts into an archive directory.
//!
//! The persisted report is the only source of truth for what moves. The
//! schedule (sequential or a bounded worker pool) is a pure function of the
//! candidate count and mean size; both schedules run the same queue-draining
//! worker. A failed move is reported and never stops the batch.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::config::ArchiveConfig;
use crate::context::SweepContext;
use crate::diagnostics::Diagnostic;
use crate::error::{MoveError, ReconError};
use crate::model::{ArtifactStatus, ReportRow};
use crate::report;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Caller's request: decide from the data, or force one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    #[default]
    Auto,
    /// `true` forces concurrent, `false` forces sequential.
    Forced(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SchedulePolicy {
    Sequential,
    Concurrent { workers: usize },
}

impl SchedulePolicy {
    pub fn workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Concurrent { workers } => *workers,
        }
    }
}

impl std::fmt::Display for SchedulePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent { workers } => write!(f, "concurrent({workers})"),
        }
    }
}

/// Many files, or small files on average, go concurrent. A few very large
/// files go sequential.
pub fn decide_schedule(candidates: usize, mean_size: Option<u64>, config: &ArchiveConfig) -> SchedulePolicy {
    let many = candidates > config.many_files_threshold;
    let small = mean_size.is_some_and(|m| m < config.large_file_bytes);
    if many || small {
        SchedulePolicy::Concurrent {
            workers: config.workers,
        }
    } else {
        SchedulePolicy::Sequential
    }
}

fn resolve_schedule(
    parallelism: Parallelism,
    candidates: usize,
    mean_size: Option<u64>,
    config: &ArchiveConfig,
) -> SchedulePolicy {
    match parallelism {
        Parallelism::Auto => decide_schedule(candidates, mean_size, config),
        Parallelism::Forced(true) => SchedulePolicy::Concurrent {
            workers: config.workers,
        },
        Parallelism::Forced(false) => SchedulePolicy::Sequential,
    }
}

// ---------------------------------------------------------------------------
// Request + Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub report: PathBuf,
    pub archive_root: PathBuf,
    /// When set, rows whose path is outside this root are skipped.
    pub source_root: Option<PathBuf>,
    pub parallelism: Parallelism,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// Unused rows in the report.
    pub candidates: usize,
    pub moved: usize,
    /// Gone before the run started or vanished mid-run.
    pub skipped_missing: usize,
    pub skipped_foreign: usize,
    pub failed: usize,
    pub schedule: SchedulePolicy,
}

/// Result of moving one file.
#[derive(Debug)]
enum MoveOutcome {
    Moved,
    Vanished,
    Failed(MoveError),
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Move every file the stored report classifies as Unused into the archive
/// root, keeping file names.
pub fn archive(request: &ArchiveRequest, ctx: &SweepContext) -> Result<ArchiveSummary, ReconError> {
    let rows = report::load(&request.report)?
        .ok_or_else(|| ReconError::NoPriorScan(request.report.clone()))?;

    ensure_archive_root(&request.archive_root)?;

    let unused = unused_paths(&rows);
    let candidates = unused.len();
    let mut skipped_missing = 0;
    let mut skipped_foreign = 0;

    // Compare resolved paths so `./data`, `data` and `/abs/data` agree.
    let source_root = request
        .source_root
        .as_ref()
        .map(|root| fs::canonicalize(root).unwrap_or_else(|_| root.clone()));

    let mut jobs = Vec::with_capacity(candidates);
    let mut total_size: u64 = 0;
    for path in unused {
        let Ok(resolved) = fs::canonicalize(&path) else {
            skipped_missing += 1;
            ctx.emit(Diagnostic::SourceVanished { path });
            continue;
        };
        if let Some(root) = &source_root {
            if !resolved.starts_with(root) {
                skipped_foreign += 1;
                ctx.emit(Diagnostic::ForeignPathSkipped { path });
                continue;
            }
        }
        match fs::metadata(&resolved) {
            Ok(meta) if meta.is_file() => {
                total_size = total_size.saturating_add(meta.len());
                jobs.push(path);
            }
            _ => {
                skipped_missing += 1;
                ctx.emit(Diagnostic::SourceVanished { path });
            }
        }
    }

    let mean_size = (!jobs.is_empty()).then(|| total_size / jobs.len() as u64);
    let schedule = resolve_schedule(request.parallelism, jobs.len(), mean_size, &ctx.config.archive);
    ctx.emit(Diagnostic::ScheduleChosen {
        policy: schedule,
        candidates: jobs.len(),
        mean_size,
    });

    let tally = run_moves(jobs, &request.archive_root, schedule, ctx);

    let summary = ArchiveSummary {
        candidates,
        moved: tally.moved,
        skipped_missing: skipped_missing + tally.vanished,
        skipped_foreign,
        failed: tally.failed,
        schedule,
    };
    ctx.emit(Diagnostic::ArchiveCompleted(summary.clone()));
    Ok(summary)
}

/// Source paths of Unused rows, in report order. Rows without a path are ignored.
pub fn unused_paths(rows: &[ReportRow]) -> Vec<PathBuf> {
    rows.iter()
        .filter(|r| r.status == ArtifactStatus::Unused && !r.file_path.is_empty())
        .map(|r| PathBuf::from(&r.file_path))
        .collect()
}

/// Create the archive root and parents. Idempotent.
pub fn ensure_archive_root(root: &Path) -> Result<(), ReconError> {
    fs::create_dir_all(root).map_err(|e| ReconError::ArchiveRoot {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !root.is_dir() {
        return Err(ReconError::ArchiveRoot {
            path: root.to_path_buf(),
            reason: "not a directory".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Tally {
    moved: usize,
    vanished: usize,
    failed: usize,
}

/// Drain `jobs` with `schedule.workers()` workers. A single worker runs on the
/// calling thread.
fn run_moves(jobs: Vec<PathBuf>, archive_root: &Path, schedule: SchedulePolicy, ctx: &SweepContext) -> Tally {
    let worker_count = schedule.workers().min(jobs.len()).max(1);
    let queue = Mutex::new(VecDeque::from(jobs));
    let tally = Mutex::new(Tally::default());

    if worker_count == 1 {
        drain_queue(&queue, archive_root, &tally, ctx);
    } else {
        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                scope.spawn(|| drain_queue(&queue, archive_root, &tally, ctx));
            }
        });
    }

    match tally.into_inner() {
        Ok(tally) => tally,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn drain_queue(queue: &Mutex<VecDeque<PathBuf>>, archive_root: &Path, tally: &Mutex<Tally>, ctx: &SweepContext) {
    loop {
        let next = {
            let mut guard = match queue.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.pop_front()
        };
        let Some(source) = next else {
            break;
        };

        let outcome = move_one(&source, archive_root);
        {
            let mut t = match tally.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match &outcome {
                MoveOutcome::Moved => t.moved += 1,
                MoveOutcome::Vanished => t.vanished += 1,
                MoveOutcome::Failed(_) => t.failed += 1,
            }
        }
        match outcome {
            MoveOutcome::Moved => ctx.emit(Diagnostic::FileMoved {
                to: destination_for(&source, archive_root).unwrap_or_default(),
                from: source,
            }),
            MoveOutcome::Vanished => ctx.emit(Diagnostic::SourceVanished { path: source }),
            MoveOutcome::Failed(e) => ctx.emit(Diagnostic::MoveFailed {
                path: source,
                reason: e.to_string(),
            }),
        }
    }
}

fn destination_for(source: &Path, archive_root: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| archive_root.join(name))
}

/// Link into the archive, then unlink the source. Where hard links are not
/// available (e.g. across devices) copy into a freshly created file instead.
///
/// The archive entry is always created exclusively, so two workers moving
/// same-named files cannot replace each other: the second one fails with
/// [`MoveError::DestinationExists`]. Only an entry created by this call is
/// ever removed again.
fn move_one(source: &Path, archive_root: &Path) -> MoveOutcome {
    let Some(dest) = destination_for(source, archive_root) else {
        return MoveOutcome::Failed(MoveError::NoFileName(source.to_path_buf()));
    };

    let io_failed = |err: io::Error| {
        MoveOutcome::Failed(MoveError::Io {
            from: source.to_path_buf(),
            to: dest.clone(),
            source: err,
        })
    };
    let classify = |err: io::Error| match err.kind() {
        ErrorKind::AlreadyExists => MoveOutcome::Failed(MoveError::DestinationExists(dest.clone())),
        ErrorKind::NotFound if !source.exists() => MoveOutcome::Vanished,
        _ => io_failed(err),
    };

    match fs::hard_link(source, &dest) {
        Ok(()) => {}
        Err(e) if matches!(e.kind(), ErrorKind::AlreadyExists | ErrorKind::NotFound) => return classify(e),
        Err(_) => {
            if let Err(e) = copy_exclusive(source, &dest) {
                return classify(e);
            }
        }
    }

    match fs::remove_file(source) {
        Ok(()) => MoveOutcome::Moved,
        // Someone else unlinked the source; the archive entry is now the only copy.
        Err(e) if e.kind() == ErrorKind::NotFound => MoveOutcome::Moved,
        Err(e) => {
            // Keep a single copy: the source stays, our archive entry goes.
            let _ = fs::remove_file(&dest);
            io_failed(e)
        }
    }
}

/// Copy `source` into a new file at `dest`; fails if `dest` exists. A
/// partial `dest` is removed on error.
fn copy_exclusive(source: &Path, dest: &Path) -> io::Result<()> {
    let mut input = File::open(source)?;
    let mut output = OpenOptions::new().write(true).create_new(true).open(dest)?;
    let copied = io::copy(&mut input, &mut output).and_then(|_| output.sync_all());
    if let Err(e) = copied {
        drop(output);
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}
