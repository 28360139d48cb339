//! `eodsweep scan` and `eodsweep move`.

use std::path::{Path, PathBuf};

use eodsweep_recon::{ArchiveRequest, ArchiveSummary, Parallelism, ScanSummary, SweepContext};

use crate::exit_codes::EXIT_MOVE_PARTIAL;
use crate::CliError;

pub fn cmd_scan(ctx: &SweepContext, root: PathBuf, report: PathBuf, json_output: bool) -> Result<(), CliError> {
    let result = eodsweep_recon::scan(&root, &report, ctx).map_err(CliError::recon)?;

    if json_output {
        let doc = serde_json::json!({
            "root": root.display().to_string(),
            "report": report.display().to_string(),
            "summary": result.summary,
        });
        print_json(&doc)?;
    } else {
        print_scan_summary(&result.summary, &report);
    }
    Ok(())
}

pub fn cmd_move(
    ctx: &SweepContext,
    root: PathBuf,
    archive_root: PathBuf,
    report: PathBuf,
    parallelism: Parallelism,
    json_output: bool,
) -> Result<(), CliError> {
    let request = ArchiveRequest {
        report,
        archive_root,
        source_root: Some(root),
        parallelism,
    };
    let summary = eodsweep_recon::archive(&request, ctx).map_err(CliError::recon)?;

    if json_output {
        let doc = serde_json::json!({
            "archive": request.archive_root.display().to_string(),
            "report": request.report.display().to_string(),
            "summary": summary,
        });
        print_json(&doc)?;
    } else {
        print_move_summary(&summary, &request.archive_root);
    }

    if summary.failed > 0 {
        return Err(CliError {
            code: EXIT_MOVE_PARTIAL,
            message: format!("{} of {} file(s) failed to move", summary.failed, summary.candidates),
            hint: Some("failed files were left in place; re-run `eodsweep scan` before retrying".into()),
        });
    }
    Ok(())
}

fn print_json(doc: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(doc)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{text}");
    Ok(())
}

fn print_scan_summary(s: &ScanSummary, report: &Path) {
    eprintln!(
        "scan: {} artifacts ({} used, {} unused), {} missing",
        s.artifacts, s.used, s.unused, s.missing
    );
    eprint!("  manifests: {} read", s.manifests_read);
    if s.manifests_skipped > 0 {
        eprint!(", {} skipped", s.manifests_skipped);
    }
    eprintln!();
    if s.conflicting_names > 0 {
        eprintln!("  {} artifact name(s) declared by more than one manifest", s.conflicting_names);
    }
    eprintln!("  report: {}", report.display());
}

fn print_move_summary(s: &ArchiveSummary, archive_root: &Path) {
    eprintln!(
        "move: {} of {} unused artifact(s) archived to {} [{}]",
        s.moved,
        s.candidates,
        archive_root.display(),
        s.schedule
    );
    if s.skipped_missing > 0 {
        eprintln!("  {} already gone, skipped", s.skipped_missing);
    }
    if s.skipped_foreign > 0 {
        eprintln!("  {} outside the scan root, skipped", s.skipped_foreign);
    }
    if s.failed > 0 {
        eprintln!("  {} failed", s.failed);
    }
}
