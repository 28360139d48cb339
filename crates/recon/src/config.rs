use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const MIB: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Tunables for a scan/move run. Every field has a default, so an empty
/// TOML document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub scan: ScanConfig,
    pub manifest: ManifestConfig,
    pub resolver: ResolverConfig,
    pub archive: ArchiveConfig,
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Artifact extension without the leading dot.
    pub artifact_extension: String,
    /// File-name suffix identifying manifests.
    pub manifest_suffix: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            artifact_extension: "eod".into(),
            manifest_suffix: ".runspec.json".into(),
        }
    }
}

impl ScanConfig {
    /// `true` when `name` ends in `.<artifact_extension>`. Case-sensitive,
    /// so `a.EOD` is not an artifact.
    pub fn is_artifact_name(&self, name: &str) -> bool {
        name.strip_suffix(self.artifact_extension.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Also index each entry's `output` path.
    pub index_outputs: bool,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Mount layout the declared paths are rewritten for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Drive-letter mounts (Windows).
    DriveLetter,
    /// Single-root mounts.
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::DriveLetter
        } else {
            Self::Posix
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// `None` = detect from the build target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub network_prefix: String,
    pub drive_prefix: String,
    pub fixture_marker: String,
    pub query_marker: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            platform: None,
            network_prefix: "/mnt/public/".into(),
            drive_prefix: "P:/".into(),
            fixture_marker: "recordings".into(),
            query_marker: "query".into(),
        }
    }
}

impl ResolverConfig {
    pub fn effective_platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Worker count for concurrent moves.
    pub workers: usize,
    /// Candidate counts above this always run concurrently.
    pub many_files_threshold: usize,
    /// Mean sizes below this run concurrently.
    pub large_file_bytes: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            many_files_threshold: 100,
            large_file_bytes: 50 * MIB,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SweepConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: SweepConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconError> {
        toml::to_string_pretty(self).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let ext = &self.scan.artifact_extension;
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ReconError::ConfigValidation(format!(
                "scan.artifact_extension must be non-empty and without a leading dot, got '{ext}'"
            )));
        }

        if self.scan.manifest_suffix.is_empty() {
            return Err(ReconError::ConfigValidation(
                "scan.manifest_suffix must not be empty".into(),
            ));
        }

        if self.archive.workers == 0 {
            return Err(ReconError::ConfigValidation(
                "archive.workers must be at least 1".into(),
            ));
        }

        if self.resolver.query_marker.is_empty() {
            return Err(ReconError::ConfigValidation(
                "resolver.query_marker must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
