//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/domweave/domweave.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `DOMWEAVE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::DEFAULT_MAX_DEPTH;

/// Errors loading or displaying settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },
}

/// How the `build` command prints a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Tree,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("html"),
            Self::Tree => f.write_str("tree"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "tree" => Ok(Self::Tree),
            other => Err(SettingsError::Config {
                message: format!("unknown output format: {other}"),
            }),
        }
    }
}

/// Unified configuration for domweave.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Maximum nesting depth accepted by the document builder
    pub max_depth: usize,
    /// Output format of `build`
    pub format: OutputFormat,
    /// Spaces per nesting level in HTML output
    pub indent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            format: OutputFormat::Html,
            indent: 2,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_depth: Option<usize>,
    pub format: Option<OutputFormat>,
    pub indent: Option<usize>,
}

/// Get the XDG config directory for domweave.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "domweave").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("domweave.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            format: overlay.format.unwrap_or(self.format),
            indent: overlay.indent.unwrap_or(self.indent),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = explicit {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply DOMWEAVE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("DOMWEAVE").prefix_separator("_"))
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(&config, "max_depth", Config::get_int)? {
            settings.max_depth = non_negative("max_depth", val)?;
        }
        if let Some(val) = env_value(&config, "format", Config::get_string)? {
            settings.format = val.parse()?;
        }
        if let Some(val) = env_value(&config, "indent", Config::get_int)? {
            settings.indent = non_negative("indent", val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# domweave configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/domweave/domweave.toml
#   File:   --config <FILE>
#   Env:    DOMWEAVE_* environment variables (e.g. DOMWEAVE_MAX_DEPTH=32)
#           DOMWEAVE_CONFIG=<FILE> is the same as --config <FILE>

# Maximum nesting depth of a document
# max_depth = 64

# Output format of `domweave build`: "html" or "tree"
# format = "html"

# Spaces per nesting level in HTML output
# indent = 2
"#
        .to_string()
    }
}

// unset is the only error that falls through to the lower layers
fn env_value<T>(
    config: &Config,
    key: &str,
    get: impl Fn(&Config, &str) -> Result<T, ConfigError>,
) -> Result<Option<T>, SettingsError> {
    match get(config, key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn non_negative(key: &str, val: i64) -> Result<usize, SettingsError> {
    usize::try_from(val).map_err(|_| SettingsError::Config {
        message: format!("{key} must not be negative: {val}"),
    })
}

fn config_err(e: ConfigError) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}
