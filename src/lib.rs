//! fpc-stackup: material catalog and layer stackup composition for flexible
//! printed circuits.
//!
//! The crate answers two questions a stackup designer keeps asking:
//!
//! - **Which material?** Browse the catalog by category, pick the columns
//!   you care about, sort, and export the table as CSV.
//! - **What does this stack behave like?** Compose an ordered stack of
//!   catalog materials, start from a reference stackup if you like, and get
//!   the thickness-weighted effective Dk, Df and secondary properties.
//!
//! Thickness is in micrometres throughout.
//!
//! # Example
//!
//! ```
//! use fpc_stackup::catalog::Catalog;
//! use fpc_stackup::stackup::{compute_derived_properties, LayerStack};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let template = catalog.template("TYPE-A").unwrap();
//! let stack = LayerStack::from_template(catalog.shared_materials(), template).unwrap();
//!
//! let props = compute_derived_properties(&stack).unwrap();
//! assert_eq!(props.layer_count, template.layers.len());
//! assert!(props.effective_dk > 1.0);
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Material catalog, reference stackups and catalog loading
//! - [`stackup`]: Resolver, layer stack editing and derived properties
//! - [`finder`]: Category selection, projection, sorting and CSV export
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types for configuration, catalog loading and export

pub mod catalog;
pub mod config;
pub mod error;
pub mod finder;
pub mod stackup;
