use std::sync::Arc;

use crate::config::SweepConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};

/// Everything a scan or move needs besides its paths: configuration and the
/// diagnostics sink. Passed explicitly into each operation.
#[derive(Clone)]
pub struct SweepContext {
    pub config: SweepConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl SweepContext {
    pub fn new(config: SweepConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    /// Events forwarded to `tracing`.
    pub fn with_tracing(config: SweepConfig) -> Self {
        Self::new(config, Arc::new(TracingSink))
    }

    pub fn emit(&self, event: Diagnostic) {
        self.sink.emit(event);
    }
}

impl std::fmt::Debug for SweepContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
