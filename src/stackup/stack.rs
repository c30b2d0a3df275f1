//! The layer stack an engineer is composing.
//!
//! A [`LayerStack`] is an ordered list of [`Layer`] references, top to bottom,
//! plus a shared handle to the material catalog it resolves against. Every
//! mutator validates first and only then applies, so a failed call leaves the
//! stack exactly as it was.
//!
//! The stack never drops below one layer: removing the last remaining layer
//! is a silent no-op.

use std::fmt;
use std::sync::Arc;

use super::error::{StackupError, StackupResult};
use super::properties::DerivedProperties;
use super::resolver::{ResolvedLayer, Resolver};
use crate::catalog::{Layer, MaterialCatalog, MaterialCategory, StackupTemplate};

/// Direction for [`LayerStack::move_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards index 0 (the top of the stack).
    Up,
    /// Towards the last index (the bottom of the stack).
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// An editable stack of layer references owned by one design session.
#[derive(Debug, Clone)]
pub struct LayerStack {
    materials: Arc<MaterialCatalog>,
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Creates a one-layer stack using the first material of the catalog's
    /// first category.
    ///
    /// # Errors
    ///
    /// [`StackupError::Inconsistent`] if the catalog has no categories or the
    /// first category has no materials. A loaded catalog never does.
    pub fn new(materials: Arc<MaterialCatalog>) -> StackupResult<Self> {
        let layer = {
            let category = materials
                .first_category()
                .ok_or_else(|| StackupError::inconsistent("material catalog is empty"))?;
            default_layer(category)?
        };
        Ok(Self {
            materials,
            layers: vec![layer],
        })
    }

    /// Creates a one-layer stack using the first material of `category`.
    ///
    /// # Errors
    ///
    /// [`StackupError::CategoryNotFound`] if the key is not in the catalog.
    pub fn with_default_category(
        materials: Arc<MaterialCatalog>,
        category: &str,
    ) -> StackupResult<Self> {
        let layer = default_layer(Resolver::new(&materials).category(category)?)?;
        Ok(Self {
            materials,
            layers: vec![layer],
        })
    }

    /// Creates a stack holding a copy of a template's layer references.
    ///
    /// # Errors
    ///
    /// See [`LayerStack::load_template`]. An empty template is rejected as
    /// inconsistent, since a stack always has at least one layer.
    pub fn from_template(
        materials: Arc<MaterialCatalog>,
        template: &StackupTemplate,
    ) -> StackupResult<Self> {
        let mut stack = Self::new(materials)?;
        stack.load_template(template)?;
        Ok(stack)
    }

    /// The catalog this stack resolves against.
    #[must_use]
    pub fn catalog(&self) -> &MaterialCatalog {
        &self.materials
    }

    /// A resolver over this stack's catalog.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.materials)
    }

    /// The layer references, top to bottom.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The layer reference at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Resolves every layer against the catalog, in stack order.
    ///
    /// # Errors
    ///
    /// [`StackupError::Inconsistent`] if a stored reference no longer
    /// resolves, which would mean the stack was corrupted.
    pub fn snapshot(&self) -> StackupResult<Vec<ResolvedLayer<'_>>> {
        let resolver = self.resolver();
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                resolver
                    .resolve_layer(index, layer)
                    .map_err(|issue| StackupError::inconsistent(format!("stored {issue}")))
            })
            .collect()
    }

    /// Computes total thickness and the thickness-weighted averages for the
    /// current layers.
    ///
    /// # Errors
    ///
    /// See [`DerivedProperties::from_layers`].
    pub fn derived_properties(&self) -> StackupResult<DerivedProperties> {
        DerivedProperties::from_layers(&self.snapshot()?)
    }

    /// Appends a layer holding the first material of `category`, or of the
    /// catalog's first category when `None`. Returns the new layer's index.
    ///
    /// # Errors
    ///
    /// [`StackupError::CategoryNotFound`] if `category` is not in the catalog.
    pub fn add_layer(&mut self, category: Option<&str>) -> StackupResult<usize> {
        let resolver = self.resolver();
        let category = match category {
            Some(key) => resolver.category(key)?,
            None => self
                .materials
                .first_category()
                .ok_or_else(|| StackupError::inconsistent("material catalog is empty"))?,
        };
        let layer = default_layer(category)?;
        self.layers.push(layer);
        Ok(self.layers.len() - 1)
    }

    /// Removes the layer at `index` and returns it, unless it is the only
    /// layer left, in which case nothing happens and `None` is returned.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`] if `index` is past the end.
    pub fn remove_layer(&mut self, index: usize) -> StackupResult<Option<Layer>> {
        self.check_index(index)?;
        if self.layers.len() <= 1 {
            return Ok(None);
        }
        Ok(Some(self.layers.remove(index)))
    }

    /// Swaps the layer at `index` with its neighbour in `direction`.
    ///
    /// Moving the top layer up or the bottom layer down is a no-op. Returns
    /// the layer's index after the call.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`] if `index` is past the end.
    pub fn move_layer(&mut self, index: usize, direction: Direction) -> StackupResult<usize> {
        self.check_index(index)?;
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < self.layers.len()),
        };
        Ok(target.map_or(index, |target| {
            self.layers.swap(index, target);
            target
        }))
    }

    /// Moves the layer at `from` so that it ends up at index `to`, shifting
    /// the layers in between.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`] if either index is past the end.
    pub fn move_layer_to(&mut self, from: usize, to: usize) -> StackupResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }

    /// Switches the layer at `index` to another category, snapping its
    /// material to that category's first material. The description is kept.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`] or [`StackupError::CategoryNotFound`].
    pub fn set_layer_category(&mut self, index: usize, category: &str) -> StackupResult<()> {
        self.check_index(index)?;
        let replacement = default_layer(self.resolver().category(category)?)?;
        let layer = &mut self.layers[index];
        layer.category = replacement.category;
        layer.material = replacement.material;
        Ok(())
    }

    /// Switches the layer at `index` to another material within its current
    /// category.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`] or [`StackupError::MaterialNotFound`].
    pub fn set_layer_material(&mut self, index: usize, material: &str) -> StackupResult<()> {
        self.check_index(index)?;
        let category = &self.layers[index].category;
        let name = self.resolver().resolve(category, material)?.name.clone();
        self.layers[index].material = name;
        Ok(())
    }

    /// Replaces both the category and the material of the layer at `index`.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`], [`StackupError::CategoryNotFound`]
    /// or [`StackupError::MaterialNotFound`].
    pub fn set_layer(&mut self, index: usize, category: &str, material: &str) -> StackupResult<()> {
        self.check_index(index)?;
        self.resolver().resolve(category, material)?;
        let layer = &mut self.layers[index];
        layer.category = category.to_string();
        layer.material = material.to_string();
        Ok(())
    }

    /// Sets the free-text description of the layer at `index`.
    ///
    /// # Errors
    ///
    /// [`StackupError::IndexOutOfRange`] if `index` is past the end.
    pub fn set_layer_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> StackupResult<()> {
        self.check_index(index)?;
        self.layers[index].description = description.into();
        Ok(())
    }

    /// Replaces the whole stack with a copy of `template`'s layer references.
    ///
    /// # Errors
    ///
    /// [`StackupError::Validation`] listing every unresolved layer, or
    /// [`StackupError::Inconsistent`] for a template with no layers. Either
    /// way the stack keeps its previous contents.
    pub fn load_template(&mut self, template: &StackupTemplate) -> StackupResult<()> {
        let validation = self.resolver().validate_template(template);
        if !validation.is_valid() {
            return Err(StackupError::Validation {
                template: template.id.clone(),
                errors: validation.errors,
            });
        }
        if template.layers.is_empty() {
            return Err(StackupError::inconsistent(format!(
                "stackup template '{}' has no layers",
                template.id
            )));
        }
        self.layers = template.layers.clone();
        Ok(())
    }

    fn check_index(&self, index: usize) -> StackupResult<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(StackupError::index_out_of_range(index, self.layers.len()))
        }
    }
}

/// A fresh layer holding `category`'s first material.
fn default_layer(category: &MaterialCategory) -> StackupResult<Layer> {
    let material = category.first_material().ok_or_else(|| {
        StackupError::inconsistent(format!("material category '{}' is empty", category.key))
    })?;
    Ok(Layer::new(&category.key, &material.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MaterialRecord;

    fn materials() -> Arc<MaterialCatalog> {
        Arc::new(MaterialCatalog::from_categories([
            MaterialCategory::new(
                "FCCL",
                "FCCL",
                vec![
                    MaterialRecord::new("NIKKAN LF-8338", 12.5, 3.2, 0.02, "NIKKAN"),
                    MaterialRecord::new("TU767", 30.0, 3.5, 0.003, "Taiflex"),
                ],
            ),
            MaterialCategory::new(
                "Cu",
                "Cu",
                vec![
                    MaterialRecord::new("MITSUI LD", 35.0, 1.0, 0.0, "Mitsui"),
                    MaterialRecord::new("Furukawa C7025", 35.0, 1.0, 0.0, "Furukawa"),
                ],
            ),
            MaterialCategory::new(
                "PTFE",
                "PTFE",
                vec![MaterialRecord::new("Rogers RO3003", 127.0, 3.0, 0.0013, "Rogers")],
            ),
        ]))
    }

    fn names(stack: &LayerStack) -> Vec<(&str, &str)> {
        stack
            .layers()
            .iter()
            .map(|l| (l.category.as_str(), l.material.as_str()))
            .collect()
    }

    fn three_layers() -> LayerStack {
        let mut stack = LayerStack::new(materials()).unwrap();
        stack.add_layer(Some("Cu")).unwrap();
        stack.add_layer(Some("PTFE")).unwrap();
        stack
    }

    #[test]
    fn new_stack_has_one_default_layer() {
        let stack = LayerStack::new(materials()).unwrap();
        assert_eq!(names(&stack), [("FCCL", "NIKKAN LF-8338")]);
        assert!(!stack.is_empty());
    }

    #[test]
    fn default_category_can_be_chosen() {
        let stack = LayerStack::with_default_category(materials(), "Cu").unwrap();
        assert_eq!(names(&stack), [("Cu", "MITSUI LD")]);
        assert!(LayerStack::with_default_category(materials(), "Au").is_err());
    }

    #[test]
    fn add_layer_appends_first_material() {
        let mut stack = LayerStack::new(materials()).unwrap();
        assert_eq!(stack.add_layer(Some("Cu")).unwrap(), 1);
        assert_eq!(stack.add_layer(None).unwrap(), 2);
        assert_eq!(
            names(&stack),
            [
                ("FCCL", "NIKKAN LF-8338"),
                ("Cu", "MITSUI LD"),
                ("FCCL", "NIKKAN LF-8338")
            ]
        );
    }

    #[test]
    fn add_layer_with_unknown_category_changes_nothing() {
        let mut stack = LayerStack::new(materials()).unwrap();
        let err = stack.add_layer(Some("GLASS")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn last_layer_cannot_be_removed() {
        let mut stack = LayerStack::new(materials()).unwrap();
        assert_eq!(stack.remove_layer(0).unwrap(), None);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn remove_layer_checks_bounds() {
        let mut stack = three_layers();
        assert_eq!(
            stack.remove_layer(3),
            Err(StackupError::index_out_of_range(3, 3))
        );
        // Out-of-range is an error even on a single-layer stack.
        let mut single = LayerStack::new(materials()).unwrap();
        assert!(single.remove_layer(1).is_err());
    }

    #[test]
    fn remove_layer_returns_removed_reference() {
        let mut stack = three_layers();
        let removed = stack.remove_layer(1).unwrap().unwrap();
        assert_eq!(removed.category, "Cu");
        assert_eq!(names(&stack), [("FCCL", "NIKKAN LF-8338"), ("PTFE", "Rogers RO3003")]);
    }

    #[test]
    fn move_layer_swaps_neighbours() {
        let mut stack = three_layers();
        assert_eq!(stack.move_layer(2, Direction::Up).unwrap(), 1);
        assert_eq!(
            names(&stack),
            [
                ("FCCL", "NIKKAN LF-8338"),
                ("PTFE", "Rogers RO3003"),
                ("Cu", "MITSUI LD")
            ]
        );
        assert_eq!(stack.move_layer(0, Direction::Down).unwrap(), 1);
        assert_eq!(stack.layers()[0].category, "PTFE");
    }

    #[test]
    fn move_layer_at_edges_is_a_no_op() {
        let mut stack = three_layers();
        let before = stack.layers().to_vec();
        assert_eq!(stack.move_layer(0, Direction::Up).unwrap(), 0);
        assert_eq!(stack.move_layer(2, Direction::Down).unwrap(), 2);
        assert_eq!(stack.layers(), before.as_slice());
        assert!(stack.move_layer(3, Direction::Up).is_err());
    }

    #[test]
    fn move_layer_to_arbitrary_position() {
        let mut stack = three_layers();
        stack.move_layer_to(0, 2).unwrap();
        assert_eq!(
            names(&stack),
            [
                ("Cu", "MITSUI LD"),
                ("PTFE", "Rogers RO3003"),
                ("FCCL", "NIKKAN LF-8338")
            ]
        );
        stack.move_layer_to(2, 0).unwrap();
        assert_eq!(stack.layers()[0].category, "FCCL");
        assert!(stack.move_layer_to(0, 3).is_err());
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn category_switch_resets_material() {
        let mut stack = three_layers();
        stack.set_layer_material(1, "Furukawa C7025").unwrap();
        stack.set_layer_description(1, "ground").unwrap();

        stack.set_layer_category(1, "FCCL").unwrap();
        let layer = stack.get(1).unwrap();
        assert_eq!(layer.category, "FCCL");
        assert_eq!(layer.material, "NIKKAN LF-8338");
        assert_eq!(layer.description, "ground");

        // Switching back does not remember the previous material.
        stack.set_layer_category(1, "Cu").unwrap();
        assert_eq!(stack.get(1).unwrap().material, "MITSUI LD");
    }

    #[test]
    fn set_layer_category_failure_leaves_stack_untouched() {
        let mut stack = three_layers();
        stack.set_layer_description(1, "ground").unwrap();
        let before = stack.layers().to_vec();

        let err = stack.set_layer_category(1, "GLASS").unwrap_err();
        assert_eq!(err, StackupError::category_not_found("GLASS"));
        assert_eq!(stack.layers(), before.as_slice());

        // Index errors win over the category lookup.
        assert!(matches!(
            stack.set_layer_category(9, "GLASS"),
            Err(StackupError::IndexOutOfRange { .. })
        ));
        assert_eq!(stack.layers(), before.as_slice());
    }

    #[test]
    fn set_layer_material_failure_leaves_stack_untouched() {
        let mut stack = three_layers();
        let before = stack.layers().to_vec();
        let err = stack.set_layer_material(0, "nonexistent").unwrap_err();
        assert_eq!(err, StackupError::material_not_found("FCCL", "nonexistent"));
        assert_eq!(stack.layers(), before.as_slice());

        // A material from another category does not count.
        assert!(stack.set_layer_material(0, "MITSUI LD").is_err());
        assert!(stack.set_layer_material(9, "TU767").is_err());
    }

    #[test]
    fn set_layer_replaces_both_references() {
        let mut stack = three_layers();
        stack.set_layer(0, "Cu", "Furukawa C7025").unwrap();
        assert_eq!(names(&stack)[0], ("Cu", "Furukawa C7025"));
        assert!(stack.set_layer(0, "Cu", "TU767").is_err());
        assert_eq!(names(&stack)[0], ("Cu", "Furukawa C7025"));
    }

    #[test]
    fn load_template_copies_references() {
        let mut template = StackupTemplate::new(
            "T",
            "T",
            vec![
                Layer::new("Cu", "MITSUI LD").with_description("signal"),
                Layer::new("PTFE", "Rogers RO3003"),
                Layer::new("Cu", "MITSUI LD").with_description("ground"),
            ],
        );
        let mut stack = LayerStack::new(materials()).unwrap();
        stack.load_template(&template).unwrap();
        assert_eq!(stack.layers(), template.layers.as_slice());

        stack.set_layer_material(0, "Furukawa C7025").unwrap();
        assert_eq!(template.layers[0].material, "MITSUI LD");

        // And the other direction: editing the template later does not reach the stack.
        template.layers[1].material = "changed".to_string();
        assert_eq!(stack.layers()[1].material, "Rogers RO3003");
    }

    #[test]
    fn invalid_template_is_never_partially_loaded() {
        let template = StackupTemplate::new(
            "BROKEN",
            "Broken",
            vec![
                Layer::new("Cu", "MITSUI LD"),
                Layer::new("GLASS", "E-glass"),
                Layer::new("Cu", "nope"),
            ],
        );
        let mut stack = three_layers();
        let before = stack.layers().to_vec();

        match stack.load_template(&template) {
            Err(StackupError::Validation { template, errors }) => {
                assert_eq!(template, "BROKEN");
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].index, 1);
                assert_eq!(errors[1].index, 2);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(stack.layers(), before.as_slice());
    }

    #[test]
    fn empty_template_is_rejected() {
        let template = StackupTemplate::new("EMPTY", "Empty", Vec::new());
        let mut stack = three_layers();
        assert!(stack.load_template(&template).is_err());
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn snapshot_resolves_in_order() {
        let stack = three_layers();
        let snapshot = stack.snapshot().unwrap();
        let thicknesses: Vec<f64> = snapshot.iter().map(|l| l.material.thickness).collect();
        assert_eq!(thicknesses, [12.5, 35.0, 127.0]);
        assert_eq!(snapshot[2].index, 2);
    }
}
