//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: nightly jobs branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-5     | report / archive | Report store and archive root failures   |
//! | 6-8     | scan / move      | Scan root, partial moves, bad config     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`recon_exit_code`] or the relevant command

use eodsweep_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Report / archive (3-5)
// =============================================================================

/// `move` or `show` ran before any scan produced a report.
pub const EXIT_NO_PRIOR_SCAN: u8 = 3;

/// Report could not be written, or exists but cannot be read back.
pub const EXIT_REPORT_STORE: u8 = 4;

/// Archive root could not be created or is not a directory.
pub const EXIT_ARCHIVE_ROOT: u8 = 5;

// =============================================================================
// Scan / move (6-8)
// =============================================================================

/// Scan root does not exist or is not a readable directory.
pub const EXIT_INVALID_ROOT: u8 = 6;

/// `move` finished but at least one file failed to move.
/// Vanished sources and foreign rows do not trigger this.
pub const EXIT_MOVE_PARTIAL: u8 = 7;

/// Configuration file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 8;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::InvalidRoot(_) => EXIT_INVALID_ROOT,
        ReconError::NoPriorScan(_) => EXIT_NO_PRIOR_SCAN,
        ReconError::ReportCorrupt { .. } | ReconError::ReportIo { .. } => EXIT_REPORT_STORE,
        ReconError::ArchiveRoot { .. } => EXIT_ARCHIVE_ROOT,
    }
}
