//! Error types for fpc-stackup's outer layers.
//!
//! These cover everything that touches the filesystem or external documents:
//! configuration, catalog loading and table export. Errors raised by stack
//! editing and property calculation live in [`crate::stackup::StackupError`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors that can occur while loading a material catalog.
///
/// Catalog loading is all-or-nothing: any of these leaves the caller
/// without a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("failed to read catalog file: {path}")]
    ReadError {
        /// Path to the catalog file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Catalog document is not valid JSON or has the wrong shape.
    #[error("failed to parse catalog from {origin}")]
    ParseError {
        /// Where the document came from (a path or `<built-in>`).
        origin: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The document declares a thickness unit we do not know.
    #[error("unknown thickness unit '{unit}' (expected 'um' or 'mm')")]
    UnknownThicknessUnit {
        /// The declared unit.
        unit: String,
    },

    /// The catalog has no categories at all.
    #[error("catalog contains no material categories")]
    Empty,

    /// A category has no materials.
    #[error("material category '{category}' is empty")]
    EmptyCategory {
        /// Category key.
        category: String,
    },

    /// Two materials in one category share a name.
    #[error("duplicate material '{material}' in category '{category}'")]
    DuplicateMaterial {
        /// Category key.
        category: String,
        /// Material name.
        material: String,
    },

    /// A material record has an out-of-range property.
    #[error("invalid material '{material}' in category '{category}': {message}")]
    InvalidMaterial {
        /// Category key.
        category: String,
        /// Material name.
        material: String,
        /// Description of what's wrong.
        message: String,
    },

    /// Two stackup templates share an id.
    #[error("duplicate stackup template id '{id}'")]
    DuplicateTemplate {
        /// Template id.
        id: String,
    },

    /// A stackup template references materials that do not exist.
    #[error("stackup template '{id}' does not resolve: {}", .errors.join("; "))]
    InvalidTemplate {
        /// Template id.
        id: String,
        /// One message per failing layer.
        errors: Vec<String>,
    },
}

/// Errors that can occur while exporting a material table.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The CSV writer failed.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing or writing the output failed.
    #[error("failed to write export output: {0}")]
    Io(#[from] std::io::Error),

    /// A row does not have one value per column label.
    #[error("row {row} has {width} value(s) but {labels} column label(s) were given")]
    ColumnMismatch {
        /// Zero-based row index.
        row: usize,
        /// Number of values in the row.
        width: usize,
        /// Number of column labels.
        labels: usize,
    },
}
