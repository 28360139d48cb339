use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::context::SweepContext;
use crate::diagnostics::Diagnostic;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::manifest::{find_manifests, ManifestIndex};
use crate::model::{ObservedArtifact, Reconciliation, ReportRow};
use crate::report;
use crate::walk::{file_name_str, TreeWalker};

/// Discover manifests under `root`, reconcile the tree against them and
/// persist the report at `report_target`.
pub fn scan(root: &Path, report_target: &Path, ctx: &SweepContext) -> Result<Reconciliation, ReconError> {
    let manifests = find_manifests(root, ctx)?;
    let index = ManifestIndex::build(&manifests, ctx);
    let result = reconcile(root, &index, ctx)?;
    report::save(&result.rows, report_target)?;
    ctx.emit(Diagnostic::ReportSaved {
        path: report_target.to_path_buf(),
        rows: result.rows.len(),
    });
    Ok(result)
}

/// Classify every artifact under `root` as Used or Unused, then add one
/// Missing row per indexed name that was not found on disk.
pub fn reconcile(root: &Path, index: &ManifestIndex, ctx: &SweepContext) -> Result<Reconciliation, ReconError> {
    let mut rows = Vec::new();
    let mut found: HashSet<String> = HashSet::new();

    for artifact in artifacts(root, ctx)? {
        match index.get(&artifact.name) {
            Some(record) => {
                rows.push(ReportRow::used(&artifact, record));
                found.insert(artifact.name);
            }
            None => rows.push(ReportRow::unused(&artifact)),
        }
    }

    for (name, record) in index.iter() {
        if !found.contains(name) {
            rows.push(ReportRow::missing(name, record));
        }
    }

    let summary = compute_summary(&rows, index);
    ctx.emit(Diagnostic::ScanCompleted(summary.clone()));
    Ok(Reconciliation { summary, rows })
}

/// Lazily enumerate artifacts under `root`. Unreadable directories are
/// reported through the context and skipped.
pub fn artifacts<'a>(
    root: &Path,
    ctx: &'a SweepContext,
) -> Result<impl Iterator<Item = ObservedArtifact> + 'a, ReconError> {
    let walker = TreeWalker::new(root)?;
    Ok(walker.filter_map(move |item| match item {
        Ok(path) => {
            let name = file_name_str(&path)?;
            if !ctx.config.scan.is_artifact_name(name) {
                return None;
            }
            let name = name.to_string();
            let created = fs::metadata(&path)
                .ok()
                .and_then(|meta| meta.created().or_else(|_| meta.modified()).ok());
            Some(ObservedArtifact { path, name, created })
        }
        Err(skipped) => {
            ctx.emit(Diagnostic::DirectorySkipped {
                path: skipped.path,
                reason: skipped.error.to_string(),
            });
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Platform, SweepConfig};
    use crate::diagnostics::CollectingSink;
    use crate::model::{ArtifactStatus, ManifestRecord, NOT_AVAILABLE};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn ctx() -> SweepContext {
        let mut config = SweepConfig::default();
        config.resolver.platform = Some(Platform::Posix);
        SweepContext::new(config, Arc::new(CollectingSink::new()))
    }

    fn declare(index: &mut ManifestIndex, name: &str) {
        index.insert(ManifestRecord {
            source_manifest: PathBuf::from("jobs/m.runspec.json"),
            declared_path: format!("/mnt/public/{name}"),
            resolved_path: PathBuf::from(format!("/mnt/public/{name}")),
        });
    }

    fn status_of<'a>(rows: &'a [ReportRow], name: &str) -> Vec<&'a ArtifactStatus> {
        rows.iter().filter(|r| r.file_name == name).map(|r| &r.status).collect()
    }

    #[test]
    fn classifies_used_unused_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.eod"), b"a").unwrap();
        fs::write(dir.path().join("sub/b.eod"), b"b").unwrap();
        fs::write(dir.path().join("notes.txt"), b"n").unwrap();

        let mut index = ManifestIndex::new();
        declare(&mut index, "a.eod");
        declare(&mut index, "c.eod");

        let result = reconcile(dir.path(), &index, &ctx()).unwrap();
        assert_eq!(result.rows.len(), 3);
        assert_eq!(status_of(&result.rows, "a.eod"), vec![&ArtifactStatus::Used]);
        assert_eq!(status_of(&result.rows, "b.eod"), vec![&ArtifactStatus::Unused]);
        assert_eq!(status_of(&result.rows, "c.eod"), vec![&ArtifactStatus::Missing]);

        let missing = result.rows.iter().find(|r| r.file_name == "c.eod").unwrap();
        assert!(missing.file_path.is_empty());
        assert_eq!(missing.creation_date, NOT_AVAILABLE);
        assert_eq!(missing.manifest_file, "jobs/m.runspec.json");

        let s = &result.summary;
        assert_eq!((s.artifacts, s.used, s.unused, s.missing), (2, 1, 1, 1));
    }

    #[test]
    fn same_name_in_two_dirs_is_used_twice_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::create_dir_all(dir.path().join("y")).unwrap();
        fs::write(dir.path().join("x/a.eod"), b"").unwrap();
        fs::write(dir.path().join("y/a.eod"), b"").unwrap();

        let mut index = ManifestIndex::new();
        declare(&mut index, "a.eod");

        let result = reconcile(dir.path(), &index, &ctx()).unwrap();
        assert_eq!(status_of(&result.rows, "a.eod"), vec![&ArtifactStatus::Used; 2]);
        assert_eq!(result.summary.missing, 0);
    }

    #[test]
    fn used_row_carries_creation_date_format() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.eod"), b"").unwrap();
        let result = reconcile(dir.path(), &ManifestIndex::new(), &ctx()).unwrap();
        let date = &result.rows[0].creation_date;
        // Either a timestamp "YYYY-MM-DD HH:MM:SS" or the sentinel.
        assert!(date == NOT_AVAILABLE || chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").is_ok());
    }

    #[test]
    fn invalid_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = reconcile(&dir.path().join("absent"), &ManifestIndex::new(), &ctx()).unwrap_err();
        assert!(matches!(err, ReconError::InvalidRoot(_)));
    }

    #[test]
    fn extension_match_is_exact_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.eod.bak"), b"").unwrap();
        fs::write(dir.path().join("b.EOD"), b"").unwrap();
        fs::write(dir.path().join("c.eod"), b"").unwrap();
        let result = reconcile(dir.path(), &ManifestIndex::new(), &ctx()).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].file_name, "c.eod");
    }
}
