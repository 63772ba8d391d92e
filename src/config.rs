//! Build configuration.
//!
//! Settings live in an optional `hypertemplate.toml` in the working
//! directory (or wherever `--config` points). The file is sparse: it is
//! merged over the stock defaults, so it only needs the keys it changes.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! docs = "docs"             # Source documents
//! templates = "templates"   # Template definitions
//! output = "site"           # Built site (also the previous build)
//!
//! [expansion]
//! max_expansions = 10000    # Usages resolved per document before giving up
//!
//! [processing]
//! max_processes = 4         # Parallel expansion workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early. Directories given on the
//! command line take precedence over the file.

use crate::expand::DEFAULT_MAX_EXPANSIONS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILENAME: &str = "hypertemplate.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Root of the source documents.
    pub docs: PathBuf,
    /// Root of the template definitions.
    pub templates: PathBuf,
    /// Root of the built site; compared against for freshness.
    pub output: PathBuf,
    pub expansion: ExpansionConfig,
    pub processing: ProcessingConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs: PathBuf::from("docs"),
            templates: PathBuf::from("templates"),
            output: PathBuf::from("site"),
            expansion: ExpansionConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expansion.max_expansions == 0 {
            return Err(ConfigError::Validation(
                "expansion.max_expansions must be at least 1".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.docs == self.templates || self.docs == self.output || self.templates == self.output
        {
            return Err(ConfigError::Validation(
                "docs, templates and output must be different directories".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Upper bound on usages resolved in one document.
    pub max_expansions: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel expansion workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the build configuration.
///
/// With an explicit `path` the file must exist. Without one,
/// [`CONFIG_FILENAME`] in `dir` is used if present and the stock defaults
/// otherwise.
pub fn load_config(path: Option<&Path>, dir: &Path) -> Result<BuildConfig, ConfigError> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = dir.join(CONFIG_FILENAME);
            if !default.exists() {
                return resolve_config(None);
            }
            default
        }
    };
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `hypertemplate.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# hypertemplate configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Directories passed on the command line (-d, -t, OUTPUT) take precedence
# over the values in this file. Unknown keys will cause an error.

# Source documents. .html/.htm files are expanded, everything else is copied.
docs = "docs"

# Template definitions. A template is used by its path relative to this
# directory with the extension removed: templates/blog/card.html -> "blog/card".
templates = "templates"

# Built site. Files here are compared against their sources to decide what
# needs rebuilding.
output = "site"

# ---------------------------------------------------------------------------
# Expansion
# ---------------------------------------------------------------------------
[expansion]
# Maximum number of template usages resolved in a single document.
max_expansions = 10000

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel expansion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
