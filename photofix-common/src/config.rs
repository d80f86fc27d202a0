//! Bootstrap configuration loading
//!
//! The TOML file only supplies defaults. Resolution priority for every setting:
//! 1. Command-line argument / environment variable (handled by the binary)
//! 2. TOML config file
//! 3. Built-in default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PHOTOFIX_CONFIG";

/// Default worker count for the per-file pipeline
pub const DEFAULT_THREADS: usize = 15;

/// Default external metadata tool
pub const DEFAULT_EXIFTOOL: &str = "exiftool";

/// Settings read from `config.toml`
///
/// Every field is optional; absent values fall through to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Concurrent files processed
    #[serde(default)]
    pub threads: Option<usize>,

    /// Path or name of the exiftool executable
    #[serde(default)]
    pub exiftool: Option<PathBuf>,

    /// Add tagged people as keywords
    #[serde(default)]
    pub people: Option<bool>,

    /// Quarantine orphaned live-photo videos
    #[serde(default)]
    pub remove_live_video: Option<bool>,

    /// Write FileCreateDate (platforms with a birth time only)
    #[serde(default)]
    pub file_create_date: Option<bool>,

    /// Set the file modification time to the capture time
    #[serde(default)]
    pub sync_file_times: Option<bool>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl TomlConfig {
    /// Worker count, falling back to the built-in default
    pub fn threads_or_default(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }

    /// Exiftool executable, falling back to `exiftool` on PATH
    pub fn exiftool_or_default(&self) -> PathBuf {
        self.exiftool
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXIFTOOL))
    }
}

/// Locate the config file
///
/// Priority order:
/// 1. Explicit path (command line)
/// 2. `PHOTOFIX_CONFIG` environment variable
/// 3. `<user config dir>/photofix/config.toml`, if it exists
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Platform config location (`~/.config/photofix/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("photofix").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the config file if one resolves, otherwise use defaults
///
/// An explicitly named file that cannot be read is an error. A missing
/// default-location file is not.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            let config = load_toml_config(&path)?;
            tracing::debug!(path = %path.display(), "Loaded config file");
            Ok(config)
        }
        None => Ok(TomlConfig::default()),
    }
}
