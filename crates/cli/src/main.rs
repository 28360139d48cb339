// eodsweep - reconcile EOD artifacts against runspec manifests and archive the unused ones

mod exit_codes;
mod logging;
mod settings;
mod show;
mod sweep;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use eodsweep_recon::{ArtifactStatus, Parallelism, ReconError, SweepConfig, SweepContext};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use settings::ConfigSource;

const DEFAULT_REPORT: &str = "eod_metadata.csv";

#[derive(Parser)]
#[command(name = "eodsweep")]
#[command(about = "Find EOD artifacts no runspec uses and move them to an archive")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Configuration file (default: per-user config.toml if present)
    #[arg(long, global = true, env = "EODSWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Also write log events to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every artifact under a root and write the report
    #[command(after_help = "\
Examples:
  eodsweep scan /data/eod
  eodsweep scan /data/eod --report /var/lib/eodsweep/eod_metadata.csv
  eodsweep scan /data/eod --json | jq .summary")]
    Scan {
        /// Directory tree holding artifacts and manifests
        root: PathBuf,

        /// Report file to write
        #[arg(long, default_value = DEFAULT_REPORT, env = "EODSWEEP_REPORT")]
        report: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },

    /// Move the Unused artifacts of the last scan into an archive
    #[command(after_help = "\
Examples:
  eodsweep move /data/eod /data/archive
  eodsweep move /data/eod /data/archive --sequential
  eodsweep move /data/eod /data/archive --report nightly.csv --json")]
    Move {
        /// Root the report was scanned from; rows outside it are skipped
        root: PathBuf,

        /// Directory receiving archived artifacts (created if absent)
        archive: PathBuf,

        /// Report produced by `eodsweep scan`
        #[arg(long, default_value = DEFAULT_REPORT, env = "EODSWEEP_REPORT")]
        report: PathBuf,

        /// Move one file at a time regardless of the workload
        #[arg(long, conflicts_with = "parallel")]
        sequential: bool,

        /// Use the worker pool regardless of the workload
        #[arg(long)]
        parallel: bool,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },

    /// Print the report from the last scan
    #[command(after_help = "\
Examples:
  eodsweep show
  eodsweep show --status unused
  eodsweep show --status missing --json")]
    Show {
        /// Report produced by `eodsweep scan`
        #[arg(long, default_value = DEFAULT_REPORT, env = "EODSWEEP_REPORT")]
        report: PathBuf,

        /// Only rows with this status (used, unused, missing)
        #[arg(long)]
        status: Option<ArtifactStatus>,

        /// Output rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print where configuration is read from
    Path,
    /// Print the effective configuration as TOML
    Show,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("EODSWEEP_COMMIT"), ")",
            "\nengine:  eodsweep-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("EODSWEEP_TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("EODSWEEP_COMMIT"), ")",
            "\nengine:  eodsweep-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("EODSWEEP_TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Must work even when the config file itself is broken.
    if let Commands::Config(ConfigCommands::Path) = cli.command {
        return cmd_config_path(cli.config);
    }

    let (config, source) = settings::load(cli.config.as_deref())?;
    tracing::debug!(source = %source, "configuration loaded");

    match cli.command {
        Commands::Scan { root, report, json } => {
            let ctx = SweepContext::with_tracing(config);
            sweep::cmd_scan(&ctx, root, report, json)
        }
        Commands::Move { root, archive, report, sequential, parallel, json } => {
            let ctx = SweepContext::with_tracing(config);
            let parallelism = match (sequential, parallel) {
                (true, _) => Parallelism::Forced(false),
                (_, true) => Parallelism::Forced(true),
                _ => Parallelism::Auto,
            };
            sweep::cmd_move(&ctx, root, archive, report, parallelism, json)
        }
        Commands::Show { report, status, json } => show::cmd_show(report, status, json),
        Commands::Config(ConfigCommands::Show) => cmd_config_show(&config, &source),
        Commands::Config(ConfigCommands::Path) => cmd_config_path(cli.config),
    }
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_path(explicit: Option<PathBuf>) -> Result<(), CliError> {
    let path = explicit.unwrap_or_else(settings::default_config_path);
    println!("{}", path.display());
    if !path.is_file() {
        eprintln!("(not present; built-in defaults apply)");
    }
    Ok(())
}

fn cmd_config_show(config: &SweepConfig, source: &ConfigSource) -> Result<(), CliError> {
    let text = config.to_toml().map_err(CliError::recon)?;
    eprintln!("# source: {source}");
    print!("{text}");
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with its registered exit code.
    pub fn recon(err: ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            ReconError::NoPriorScan(_) => Some("run `eodsweep scan <root>` with the same --report first".to_string()),
            ReconError::InvalidRoot(_) => Some("the scan root must be an existing, readable directory".to_string()),
            ReconError::ReportCorrupt { .. } => Some("re-run `eodsweep scan` to regenerate the report".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
