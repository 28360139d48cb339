//! `eodsweep show`: print the persisted report.

use std::path::PathBuf;

use eodsweep_recon::report;
use eodsweep_recon::{ArtifactStatus, ReconError, ReportRow};

use crate::util::{display_width, pad_right};
use crate::CliError;

const MAX_PATH_WIDTH: usize = 60;
const MAX_NAME_WIDTH: usize = 32;

pub fn cmd_show(report_path: PathBuf, status: Option<ArtifactStatus>, json_output: bool) -> Result<(), CliError> {
    let rows = report::load(&report_path)
        .map_err(CliError::recon)?
        .ok_or_else(|| CliError::recon(ReconError::NoPriorScan(report_path.clone())))?;
    let selected = report::filter_by_status(&rows, status);

    if json_output {
        let text = serde_json::to_string_pretty(&selected)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    for line in render_table(&selected) {
        println!("{line}");
    }
    eprintln!("{} of {} row(s)", selected.len(), rows.len());
    Ok(())
}

fn render_table(rows: &[&ReportRow]) -> Vec<String> {
    let status_w = column_width(rows, "Status", usize::MAX, |r| r.status.to_string());
    let name_w = column_width(rows, "File Name", MAX_NAME_WIDTH, |r| r.file_name.clone());
    let date_w = column_width(rows, "Creation Date", usize::MAX, |r| r.creation_date.clone());
    let path_w = column_width(rows, "Location", MAX_PATH_WIDTH, |r| location(r).to_string());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{}  {}  {}  {}",
        pad_right("Status", status_w),
        pad_right("File Name", name_w),
        pad_right("Creation Date", date_w),
        pad_right("Location", path_w),
    ));
    lines.push("-".repeat(status_w + name_w + date_w + path_w + 6));
    for r in rows {
        let line = format!(
            "{}  {}  {}  {}",
            pad_right(&r.status.to_string(), status_w),
            pad_right(&r.file_name, name_w),
            pad_right(&r.creation_date, date_w),
            pad_right(location(r), path_w),
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Where the artifact lives, or where a manifest expected it.
fn location(row: &ReportRow) -> &str {
    if row.file_path.is_empty() {
        &row.resolved_manifest_path
    } else {
        &row.file_path
    }
}

fn column_width(rows: &[&ReportRow], header: &str, cap: usize, value: impl Fn(&ReportRow) -> String) -> usize {
    rows.iter()
        .map(|r| display_width(&value(r)))
        .chain(std::iter::once(display_width(header)))
        .max()
        .unwrap_or(0)
        .min(cap)
}
