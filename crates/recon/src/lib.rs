//! `eodsweep-recon`: EOD artifact reconciliation and archival engine.
//!
//! Pure engine crate: walks an artifact tree, cross-references it against
//! runspec manifests, persists the Used/Unused/Missing classification and
//! later moves Unused artifacts into an archive. No CLI dependencies; all
//! diagnostics go through the sink carried by [`SweepContext`].

pub mod archive;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod manifest;
pub mod model;
pub mod report;
pub mod resolve;
pub mod walk;

pub use archive::{archive, decide_schedule, ArchiveRequest, ArchiveSummary, Parallelism, SchedulePolicy};
pub use config::SweepConfig;
pub use context::SweepContext;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use engine::{reconcile, scan};
pub use error::ReconError;
pub use manifest::ManifestIndex;
pub use model::{ArtifactStatus, ManifestRecord, Reconciliation, ReportRow, ScanSummary};
pub use resolve::{PathResolver, PathRewriteRule};
