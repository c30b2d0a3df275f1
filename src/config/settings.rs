//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::ThicknessUnit;
use crate::error::ConfigError;

/// Log levels accepted in `logging.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Largest accepted `display.decimals`.
const MAX_DECIMALS: usize = 12;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// External catalog document. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Category new stacks start from. The catalog's first category when unset.
    #[serde(default)]
    pub default_category: Option<String>,

    /// Table display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if ThicknessUnit::from_str_loose(&self.display.thickness_unit).is_none() {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid thickness unit '{}'. Must be one of: um, mm",
                    self.display.thickness_unit
                ),
            });
        }

        if self.display.decimals > MAX_DECIMALS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "display.decimals is {}, at most {MAX_DECIMALS} is supported",
                    self.display.decimals
                ),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if let Some(category) = &self.default_category {
            if category.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "default_category must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// The configured display unit.
    ///
    /// Falls back to micrometres if the config was never validated.
    #[must_use]
    pub fn thickness_unit(&self) -> ThicknessUnit {
        ThicknessUnit::from_str_loose(&self.display.thickness_unit).unwrap_or_default()
    }
}

/// Table display configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Unit thickness columns are shown in: "um" or "mm".
    /// Default: "um"
    #[serde(default = "default_thickness_unit")]
    pub thickness_unit: String,

    /// Decimal places for numeric cells in text output.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            thickness_unit: default_thickness_unit(),
            decimals: default_decimals(),
        }
    }
}

fn default_thickness_unit() -> String {
    "um".to_string()
}

const fn default_decimals() -> usize {
    4
}

/// CSV export configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Prefix CSV files with a UTF-8 byte-order mark.
    #[serde(default = "default_true")]
    pub byte_order_mark: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            byte_order_mark: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
