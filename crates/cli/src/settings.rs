// Sweep configuration discovery
// Loaded from --config, else ~/.config/eodsweep/config.toml, else defaults

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use eodsweep_recon::SweepConfig;

use crate::exit_codes::EXIT_USAGE;
use crate::CliError;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config` or `EODSWEEP_CONFIG`.
    Explicit(PathBuf),
    /// Found at the per-user default location.
    Discovered(PathBuf),
    /// Nothing on disk; built-in defaults.
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{} (explicit)", path.display()),
            Self::Discovered(path) => write!(f, "{}", path.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Per-user config file location, whether or not it exists.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eodsweep")
        .join("config.toml")
}

/// Resolve and load the effective configuration.
///
/// An explicit path must exist. The default location is optional.
pub fn load(explicit: Option<&Path>) -> Result<(SweepConfig, ConfigSource), CliError> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path).map_err(|e| {
            CliError {
                code: EXIT_USAGE,
                message: format!("cannot read config {}: {e}", path.display()),
                hint: None,
            }
        })?;
        let config = parse(&text, path)?;
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    let path = default_config_path();
    match fs::read_to_string(&path) {
        Ok(text) => {
            let config = parse(&text, &path)?;
            Ok((config, ConfigSource::Discovered(path)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok((SweepConfig::default(), ConfigSource::Defaults)),
        Err(e) => Err(CliError::general(format!("cannot read config {}: {e}", path.display()))),
    }
}

fn parse(text: &str, path: &Path) -> Result<SweepConfig, CliError> {
    SweepConfig::from_toml(text).map_err(|e| {
        CliError::recon(e).with_hint(format!("fix {} or run `eodsweep config show` for the defaults", path.display()))
    })
}
