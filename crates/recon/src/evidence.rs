use crate::manifest::ManifestIndex;
use crate::model::{ArtifactStatus, ReportRow, ScanSummary};

/// Compute summary statistics from classified rows.
pub fn compute_summary(rows: &[ReportRow], index: &ManifestIndex) -> ScanSummary {
    let mut used = 0;
    let mut unused = 0;
    let mut missing = 0;

    for r in rows {
        match r.status {
            ArtifactStatus::Used => used += 1,
            ArtifactStatus::Unused => unused += 1,
            ArtifactStatus::Missing => missing += 1,
        }
    }

    ScanSummary {
        artifacts: used + unused,
        used,
        unused,
        missing,
        manifests_read: index.manifests_read(),
        manifests_skipped: index.manifests_skipped(),
        conflicting_names: index.conflicting_names(),
    }
}
