//! Error types for stack editing and property calculation.

use std::fmt;

use thiserror::Error;

/// Result type for stackup operations.
pub type StackupResult<T> = Result<T, StackupError>;

/// Errors raised by the resolver, the layer stack and the calculator.
///
/// Every operation that returns one of these has left its inputs untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StackupError {
    /// The category key is not in the catalog.
    #[error("category '{category}' not found")]
    CategoryNotFound {
        /// Category key that was looked up.
        category: String,
    },

    /// The category exists but has no material with this name.
    #[error("material '{material}' not found in category '{category}'")]
    MaterialNotFound {
        /// Category key.
        category: String,
        /// Material name that was looked up.
        material: String,
    },

    /// A layer index is out of range.
    #[error("layer index {index} out of range for a stack of {len} layer(s)")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Stack length at the time of the call.
        len: usize,
    },

    /// A template could not be loaded because some of its layers do not resolve.
    #[error("stackup template '{template}' has {} unresolved layer(s)", .errors.len())]
    Validation {
        /// Template id.
        template: String,
        /// One entry per failing layer.
        errors: Vec<LayerIssue>,
    },

    /// An internal invariant was violated (for example a zero total thickness).
    #[error("internal consistency failure: {message}")]
    Inconsistent {
        /// Description of the violated invariant.
        message: String,
    },
}

impl StackupError {
    /// Creates a category-not-found error.
    pub fn category_not_found(category: impl Into<String>) -> Self {
        Self::CategoryNotFound {
            category: category.into(),
        }
    }

    /// Creates a material-not-found error.
    pub fn material_not_found(category: impl Into<String>, material: impl Into<String>) -> Self {
        Self::MaterialNotFound {
            category: category.into(),
            material: material.into(),
        }
    }

    /// Creates an index error.
    #[must_use]
    pub const fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Creates an internal consistency error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }

    /// Returns `true` for either flavour of lookup failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound { .. } | Self::MaterialNotFound { .. }
        )
    }
}

/// A resolution failure tied to a layer position.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerIssue {
    /// Zero-based layer index.
    pub index: usize,
    /// What went wrong.
    pub error: StackupError,
}

impl fmt::Display for LayerIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Layers are numbered from 1 for humans.
        write!(f, "layer {}: {}", self.index + 1, self.error)
    }
}
