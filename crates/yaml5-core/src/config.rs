//! Configuration types for yaml5.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for yaml5.
///
/// The TOML form is:
///
/// ```toml
/// [allow]
/// single_quote_strings = true
/// ident_obj_keys = true
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Relaxations of the YAML5 rules.
    #[serde(default)]
    pub allow: AllowConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Sets whether `'...'` strings are accepted.
    #[must_use]
    pub fn with_single_quote_strings(mut self, allow: bool) -> Self {
        self.allow.single_quote_strings = allow;
        self
    }

    /// Sets whether unquoted identifier keys are accepted.
    #[must_use]
    pub fn with_ident_obj_keys(mut self, allow: bool) -> Self {
        self.allow.ident_obj_keys = allow;
        self
    }
}

/// The `[allow]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowConfig {
    /// Accept `'...'` string literals.
    #[serde(default = "default_true")]
    pub single_quote_strings: bool,

    /// Accept unquoted object keys that are valid ES5.1 identifiers.
    #[serde(default = "default_true")]
    pub ident_obj_keys: bool,
}

impl Default for AllowConfig {
    fn default() -> Self {
        Self {
            single_quote_strings: true,
            ident_obj_keys: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
