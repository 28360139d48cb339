//! Rewriting manifest-declared paths onto the local mount layout.
//!
//! A [`PathResolver`] gates on the artifact extension and then runs an
//! ordered list of [`PathRewriteRule`]s. Each rule sees the output of the
//! previous one. Rules never fail; a rule that does not apply returns `None`
//! and the path passes through unchanged.

use std::path::{Path, PathBuf};

use crate::config::{Platform, ResolverConfig, ScanConfig};

pub trait PathRewriteRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// `current` is the path after earlier rules; `declared` is the path as
    /// written in the manifest at `manifest`.
    fn rewrite(&self, current: &str, declared: &str, manifest: &Path) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Network mount prefix → drive-letter prefix, on drive-letter platforms only.
#[derive(Debug, Clone)]
pub struct MountPrefixRule {
    pub network_prefix: String,
    pub drive_prefix: String,
    pub platform: Platform,
}

impl PathRewriteRule for MountPrefixRule {
    fn name(&self) -> &'static str {
        "mount_prefix"
    }

    fn rewrite(&self, current: &str, _declared: &str, _manifest: &Path) -> Option<String> {
        if self.platform != Platform::DriveLetter || self.network_prefix.is_empty() {
            return None;
        }
        if !current.contains(&self.network_prefix) {
            return None;
        }
        Some(current.replacen(&self.network_prefix, &self.drive_prefix, 1))
    }
}

/// Re-anchors a declaration onto the manifest's own directory.
///
/// The manifest path is cut at the first occurrence of `query_marker` and the
/// declared path is appended in place of the cut suffix. Paths that point into
/// a fixture recording directory (`fixture_marker`) are left alone, as are
/// manifests whose path has no query marker.
#[derive(Debug, Clone)]
pub struct ManifestAnchorRule {
    pub fixture_marker: String,
    pub query_marker: String,
}

impl PathRewriteRule for ManifestAnchorRule {
    fn name(&self) -> &'static str {
        "manifest_anchor"
    }

    fn rewrite(&self, current: &str, declared: &str, manifest: &Path) -> Option<String> {
        if !self.fixture_marker.is_empty() && current.contains(&self.fixture_marker) {
            return None;
        }
        let manifest = manifest.to_string_lossy();
        let cut = manifest.find(&self.query_marker)?;
        Some(format!("{}{}", &manifest[..cut], declared))
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

pub struct PathResolver {
    scan: ScanConfig,
    rules: Vec<Box<dyn PathRewriteRule>>,
}

impl PathResolver {
    /// Resolver with no rewrite rules: artifact paths pass through verbatim.
    pub fn new(scan: &ScanConfig) -> Self {
        Self {
            scan: scan.clone(),
            rules: Vec::new(),
        }
    }

    /// The standard rule order: mount prefix, then manifest anchor.
    pub fn from_config(scan: &ScanConfig, resolver: &ResolverConfig) -> Self {
        Self::new(scan)
            .with_rule(MountPrefixRule {
                network_prefix: resolver.network_prefix.clone(),
                drive_prefix: resolver.drive_prefix.clone(),
                platform: resolver.effective_platform(),
            })
            .with_rule(ManifestAnchorRule {
                fixture_marker: resolver.fixture_marker.clone(),
                query_marker: resolver.query_marker.clone(),
            })
    }

    pub fn with_rule(mut self, rule: impl PathRewriteRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn resolve(&self, declared: &str, manifest: &Path) -> PathBuf {
        if !self.scan.is_artifact_name(artifact_name(declared)) {
            return PathBuf::from(declared);
        }
        let mut current = declared.to_string();
        for rule in &self.rules {
            if let Some(next) = rule.rewrite(&current, declared, manifest) {
                current = next;
            }
        }
        PathBuf::from(current)
    }
}

/// Final path segment, accepting both `/` and `\` separators.
pub fn artifact_name(declared: &str) -> &str {
    declared.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(declared)
}
