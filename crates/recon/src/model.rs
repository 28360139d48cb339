use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Sentinel written in place of a creation date that is not available.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Manifest side
// ---------------------------------------------------------------------------

/// One declared input (or output) path from one manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub source_manifest: PathBuf,
    pub declared_path: String,
    pub resolved_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Tree side
// ---------------------------------------------------------------------------

/// An artifact observed on disk during the tree walk.
#[derive(Debug, Clone)]
pub struct ObservedArtifact {
    pub path: PathBuf,
    pub name: String,
    pub created: Option<SystemTime>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactStatus {
    Used,
    Unused,
    Missing,
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Used => write!(f, "Used"),
            Self::Unused => write!(f, "Unused"),
            Self::Missing => write!(f, "Missing"),
        }
    }
}

impl std::str::FromStr for ArtifactStatus {
    type Err = String;

    /// Case-insensitive, so CLI filters accept `unused` as well as `Unused`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "used" => Ok(Self::Used),
            "unused" => Ok(Self::Unused),
            "missing" => Ok(Self::Missing),
            other => Err(format!("unknown status '{other}' (expected used, unused or missing)")),
        }
    }
}

/// One row of the persisted report. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "File Path")]
    pub file_path: String,
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Creation Date")]
    pub creation_date: String,
    #[serde(rename = "Status")]
    pub status: ArtifactStatus,
    #[serde(rename = "Manifest File")]
    pub manifest_file: String,
    #[serde(rename = "Resolved Manifest Path")]
    pub resolved_manifest_path: String,
}

impl ReportRow {
    /// Row for an on-disk artifact with no manifest declaring it.
    pub fn unused(artifact: &ObservedArtifact) -> Self {
        Self {
            file_path: artifact.path.to_string_lossy().into_owned(),
            file_name: artifact.name.clone(),
            creation_date: crate::report::format_creation(artifact.created),
            status: ArtifactStatus::Unused,
            manifest_file: String::new(),
            resolved_manifest_path: String::new(),
        }
    }

    /// Row for an on-disk artifact declared by `record`.
    pub fn used(artifact: &ObservedArtifact, record: &ManifestRecord) -> Self {
        Self {
            status: ArtifactStatus::Used,
            manifest_file: record.source_manifest.to_string_lossy().into_owned(),
            resolved_manifest_path: record.resolved_path.to_string_lossy().into_owned(),
            ..Self::unused(artifact)
        }
    }

    /// Row for a declared artifact that is not on disk.
    pub fn missing(name: &str, record: &ManifestRecord) -> Self {
        Self {
            file_path: String::new(),
            file_name: name.to_string(),
            creation_date: NOT_AVAILABLE.to_string(),
            status: ArtifactStatus::Missing,
            manifest_file: record.source_manifest.to_string_lossy().into_owned(),
            resolved_manifest_path: record.resolved_path.to_string_lossy().into_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub artifacts: usize,
    pub used: usize,
    pub unused: usize,
    pub missing: usize,
    pub manifests_read: usize,
    pub manifests_skipped: usize,
    pub conflicting_names: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub summary: ScanSummary,
    pub rows: Vec<ReportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Unused".parse::<ArtifactStatus>(), Ok(ArtifactStatus::Unused));
        assert_eq!("MISSING".parse::<ArtifactStatus>(), Ok(ArtifactStatus::Missing));
        assert!("stale".parse::<ArtifactStatus>().is_err());
    }

    #[test]
    fn used_row_keeps_artifact_fields() {
        let artifact = ObservedArtifact {
            path: PathBuf::from("/data/eod/a.eod"),
            name: "a.eod".into(),
            created: None,
        };
        let record = ManifestRecord {
            source_manifest: PathBuf::from("/data/jobs/x.runspec.json"),
            declared_path: "a.eod".into(),
            resolved_path: PathBuf::from("/data/jobs/a.eod"),
        };
        let row = ReportRow::used(&artifact, &record);
        assert_eq!(row.file_path, "/data/eod/a.eod");
        assert_eq!(row.creation_date, NOT_AVAILABLE);
        assert_eq!(row.status, ArtifactStatus::Used);
        assert_eq!(row.manifest_file, "/data/jobs/x.runspec.json");
        assert_eq!(row.resolved_manifest_path, "/data/jobs/a.eod");
    }

    #[test]
    fn missing_row_has_empty_path() {
        let record = ManifestRecord {
            source_manifest: PathBuf::from("m.runspec.json"),
            declared_path: "c.eod".into(),
            resolved_path: PathBuf::from("c.eod"),
        };
        let row = ReportRow::missing("c.eod", &record);
        assert!(row.file_path.is_empty());
        assert_eq!(row.creation_date, NOT_AVAILABLE);
        assert_eq!(row.status, ArtifactStatus::Missing);
    }
}
