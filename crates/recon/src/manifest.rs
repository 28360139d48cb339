//! Runspec manifest parsing and the name → declaration index.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::context::SweepContext;
use crate::diagnostics::Diagnostic;
use crate::error::{ManifestError, ReconError};
use crate::model::ManifestRecord;
use crate::resolve::{artifact_name, PathResolver};
use crate::walk::{file_name_str, TreeWalker};

/// One job entry in a runspec file.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    output: Option<String>,
}

/// All manifest files under `root`, sorted by path.
pub fn find_manifests(root: &Path, ctx: &SweepContext) -> Result<Vec<PathBuf>, ReconError> {
    let suffix = &ctx.config.scan.manifest_suffix;
    let mut found = Vec::new();
    for item in TreeWalker::new(root)? {
        match item {
            Ok(path) => {
                if file_name_str(&path).is_some_and(|name| name.ends_with(suffix.as_str())) {
                    found.push(path);
                }
            }
            Err(skipped) => ctx.emit(Diagnostic::DirectorySkipped {
                path: skipped.path,
                reason: skipped.error.to_string(),
            }),
        }
    }
    found.sort();
    ctx.emit(Diagnostic::ManifestsDiscovered {
        root: root.to_path_buf(),
        count: found.len(),
    });
    Ok(found)
}

/// Parse one manifest into records, in declaration order.
pub fn parse_manifest(
    path: &Path,
    resolver: &PathResolver,
    index_outputs: bool,
) -> Result<Vec<ManifestRecord>, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(&text).map_err(|source| ManifestError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = Vec::new();
    for entry in entries {
        let outputs = entry.output.filter(|_| index_outputs).filter(|o| !o.is_empty());
        for declared in entry.inputs.into_iter().chain(outputs) {
            let resolved_path = resolver.resolve(&declared, path);
            records.push(ManifestRecord {
                source_manifest: path.to_path_buf(),
                declared_path: declared,
                resolved_path,
            });
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Artifact name → every record declaring it, in manifest processing order.
///
/// Linkage uses the last record seen for a name; earlier declarations are
/// kept so conflicts can be reported.
#[derive(Debug, Default, Clone)]
pub struct ManifestIndex {
    entries: BTreeMap<String, Vec<ManifestRecord>>,
    manifests_read: usize,
    manifests_skipped: usize,
}

impl ManifestIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every manifest and index its declarations. Manifests that fail
    /// to parse are skipped and reported.
    pub fn build(manifests: &[PathBuf], ctx: &SweepContext) -> Self {
        let resolver = PathResolver::from_config(&ctx.config.scan, &ctx.config.resolver);
        let mut index = Self::new();

        for manifest in manifests {
            match parse_manifest(manifest, &resolver, ctx.config.manifest.index_outputs) {
                Ok(records) => {
                    index.manifests_read += 1;
                    for record in records {
                        index.insert(record);
                    }
                }
                Err(e) => {
                    index.manifests_skipped += 1;
                    ctx.emit(Diagnostic::ManifestSkipped {
                        path: manifest.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        for (name, records) in index.conflicts() {
            ctx.emit(Diagnostic::ConflictingDeclaration {
                name: name.to_string(),
                manifests: distinct_manifests(records),
            });
        }
        ctx.emit(Diagnostic::IndexBuilt {
            names: index.len(),
            conflicting: index.conflicting_names(),
        });
        index
    }

    /// Key is the final segment of the declared path. Empty names are ignored.
    pub fn insert(&mut self, record: ManifestRecord) {
        let name = artifact_name(&record.declared_path);
        if name.is_empty() {
            return;
        }
        self.entries.entry(name.to_string()).or_default().push(record);
    }

    /// The record linked in the report: the last one seen.
    pub fn get(&self, name: &str) -> Option<&ManifestRecord> {
        self.entries.get(name).and_then(|records| records.last())
    }

    pub fn records(&self, name: &str) -> &[ManifestRecord] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names in sorted order, each with its linked record.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestRecord)> {
        self.entries
            .iter()
            .filter_map(|(name, records)| records.last().map(|r| (name.as_str(), r)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn manifests_read(&self) -> usize {
        self.manifests_read
    }

    pub fn manifests_skipped(&self) -> usize {
        self.manifests_skipped
    }

    /// Names declared by more than one distinct manifest.
    pub fn conflicts(&self) -> impl Iterator<Item = (&str, &[ManifestRecord])> {
        self.entries
            .iter()
            .filter(|(_, records)| distinct_manifests(records).len() > 1)
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn conflicting_names(&self) -> usize {
        self.conflicts().count()
    }
}

fn distinct_manifests(records: &[ManifestRecord]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = Vec::new();
    for record in records {
        if !out.contains(&record.source_manifest) {
            out.push(record.source_manifest.clone());
        }
    }
    out
}
