//! Layer-stack editing and derived property calculation.
//!
//! A [`LayerStack`] is an ordered list of layer references, each naming a
//! (category, material) pair in a shared [`MaterialCatalog`]. References are
//! resolved on demand through a [`Resolver`], so the stack never holds stale
//! copies of catalog data.
//!
//! Every mutator validates its arguments before touching the stack: a call
//! that returns an error leaves the stack exactly as it was.
//!
//! [`MaterialCatalog`]: crate::catalog::MaterialCatalog

mod error;
mod properties;
mod resolver;
mod stack;

pub use crate::catalog::Layer;
pub use error::{LayerIssue, StackupError, StackupResult};
pub use properties::{compute_derived_properties, DerivedProperties};
pub use resolver::{ResolvedLayer, Resolver, ValidationResult, ValidationWarning};
pub use stack::{Direction, LayerStack};
