//! Material catalog and reference stackups.
//!
//! The catalog is the read-only reference dataset every other part of the
//! crate works against:
//!
//! - [`MaterialCatalog`]: materials grouped by category, in catalog order
//! - [`StackupTemplate`]: named reference stackups whose layers point into
//!   the material catalog by (category, name)
//!
//! A [`Catalog`] is built once, validated as a whole, and then shared. The
//! material table sits behind an [`Arc`] so any number of design sessions can
//! hold it without copying or locking.
//!
//! # Example
//!
//! ```
//! use fpc_stackup::catalog::Catalog;
//!
//! let catalog = Catalog::builtin().unwrap();
//! let copper = catalog.materials().material("Cu", "MITSUI LD").unwrap();
//! assert!((copper.thickness - 35.0).abs() < 1e-9); // micrometres
//! ```

mod loader;
pub mod material;
pub mod template;
pub mod units;

pub use material::{MaterialCatalog, MaterialCategory, MaterialRecord, SecondaryProperty};
pub use template::{ElectricalParam, Layer, StackupTemplate};
pub use units::ThicknessUnit;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::CatalogError;

/// The reference dataset shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Materials plus reference stackups, validated together.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: Option<String>,
    materials: Arc<MaterialCatalog>,
    templates: Vec<StackupTemplate>,
}

impl Catalog {
    /// Parses the built-in reference catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded dataset itself is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = loader::parse(BUILTIN_CATALOG, "<built-in>")?;

        info!(
            categories = catalog.materials.len(),
            templates = catalog.templates.len(),
            "Loaded built-in material catalog"
        );

        Ok(catalog)
    }

    /// Parses a catalog document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any load-time validation
    /// fails (see [`CatalogError`]).
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        loader::parse(json, "<string>")
    }

    /// Reads and parses a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or for any reason
    /// [`Catalog::from_json_str`] would.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = loader::parse(&contents, &path.display().to_string())?;

        info!(
            path = %path.display(),
            categories = catalog.materials.len(),
            templates = catalog.templates.len(),
            "Loaded material catalog"
        );

        Ok(catalog)
    }

    /// Builds a catalog from already-typed parts, running the same validation
    /// as a document load except the thickness conversion (values are taken
    /// as micrometres).
    ///
    /// # Errors
    ///
    /// Returns an error if any template fails to resolve or ids collide.
    pub fn from_parts(
        materials: &MaterialCatalog,
        templates: Vec<StackupTemplate>,
    ) -> Result<Self, CatalogError> {
        loader::from_parts(materials, templates)
    }

    /// Dataset version string, if the document declared one.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The material table.
    #[must_use]
    pub fn materials(&self) -> &MaterialCatalog {
        &self.materials
    }

    /// A shared handle to the material table, for design sessions.
    #[must_use]
    pub fn shared_materials(&self) -> Arc<MaterialCatalog> {
        Arc::clone(&self.materials)
    }

    /// Reference stackups in catalog order.
    #[must_use]
    pub fn templates(&self) -> &[StackupTemplate] {
        &self.templates
    }

    /// Looks up a reference stackup by id.
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&StackupTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Reference stackups whose name, display category or description
    /// contains `term` (case-insensitive), in catalog order.
    #[must_use]
    pub fn search_templates(&self, term: &str) -> Vec<&StackupTemplate> {
        self.templates.iter().filter(|t| t.matches(term)).collect()
    }
}
