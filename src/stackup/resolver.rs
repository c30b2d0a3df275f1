//! Catalog resolver: turns (category, material) references into records.
//!
//! Matching is exact. There is no case folding, trimming or fuzzy matching;
//! a reference either names a catalog entry or it does not.

use std::fmt;

use serde::Serialize;

use super::error::{LayerIssue, StackupError, StackupResult};
use crate::catalog::{
    Layer, MaterialCatalog, MaterialCategory, MaterialRecord, SecondaryProperty, StackupTemplate,
};

/// A layer reference together with the catalog entries it points at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedLayer<'a> {
    /// Zero-based position in the stack.
    pub index: usize,

    /// The reference as stored in the stack.
    pub layer: &'a Layer,

    /// Display name of the owning category.
    pub category_name: &'a str,

    /// The resolved material.
    pub material: &'a MaterialRecord,
}

/// A missing optional property on a resolved layer.
///
/// Warnings never make a template invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Zero-based layer index.
    pub index: usize,
    /// Material name.
    pub material: String,
    /// The property that has no value.
    pub property: SecondaryProperty,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layer {}: material '{}' has no {} value",
            self.index + 1,
            self.material,
            self.property
        )
    }
}

/// Outcome of validating every layer of a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// One entry per layer that failed to resolve.
    pub errors: Vec<LayerIssue>,
    /// Missing optional properties on layers that did resolve.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// `true` when every layer resolved. Warnings do not count.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lookup layer over a material catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
    materials: &'c MaterialCatalog,
}

impl<'c> Resolver<'c> {
    /// Creates a resolver over `materials`.
    #[must_use]
    pub const fn new(materials: &'c MaterialCatalog) -> Self {
        Self { materials }
    }

    /// Looks up a category by key.
    ///
    /// # Errors
    ///
    /// [`StackupError::CategoryNotFound`] if the key is not in the catalog.
    pub fn category(&self, key: &str) -> StackupResult<&'c MaterialCategory> {
        self.materials
            .category(key)
            .ok_or_else(|| StackupError::category_not_found(key))
    }

    /// Looks up a material by category key and exact name.
    ///
    /// # Errors
    ///
    /// [`StackupError::CategoryNotFound`] or [`StackupError::MaterialNotFound`].
    pub fn resolve(&self, category: &str, material: &str) -> StackupResult<&'c MaterialRecord> {
        self.category(category)?
            .material(material)
            .ok_or_else(|| StackupError::material_not_found(category, material))
    }

    /// Resolves a layer reference, tagging any failure with the layer index.
    ///
    /// # Errors
    ///
    /// A [`LayerIssue`] wrapping the lookup failure.
    pub fn resolve_layer<'l>(
        &self,
        index: usize,
        layer: &'l Layer,
    ) -> Result<ResolvedLayer<'l>, LayerIssue>
    where
        'c: 'l,
    {
        let issue = |error| LayerIssue { index, error };
        let category = self.category(&layer.category).map_err(issue)?;
        let material = category.material(&layer.material).ok_or_else(|| {
            issue(StackupError::material_not_found(
                &layer.category,
                &layer.material,
            ))
        })?;

        Ok(ResolvedLayer {
            index,
            layer,
            category_name: &category.display_name,
            material,
        })
    }

    /// Resolves every layer of a template, collecting all failures rather
    /// than stopping at the first.
    #[must_use]
    pub fn validate_template(&self, template: &StackupTemplate) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (index, layer) in template.layers.iter().enumerate() {
            match self.resolve_layer(index, layer) {
                Ok(resolved) => {
                    result.warnings.extend(
                        SecondaryProperty::ALL
                            .into_iter()
                            .filter(|p| resolved.material.secondary(*p).is_none())
                            .map(|property| ValidationWarning {
                                index,
                                material: resolved.material.name.clone(),
                                property,
                            }),
                    );
                }
                Err(issue) => result.errors.push(issue),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn materials() -> MaterialCatalog {
        MaterialCatalog::from_categories([
            MaterialCategory::new(
                "Cu",
                "Copper",
                vec![MaterialRecord::new("MITSUI LD", 35.0, 1.0, 0.0, "Mitsui")
                    .with_secondary(SecondaryProperty::YoungModulus, 115.0)
                    .with_secondary(SecondaryProperty::PeelStrength, 1.3)
                    .with_secondary(SecondaryProperty::AbsorptionRate, 0.0)
                    .with_secondary(SecondaryProperty::ThermalConductivity, 398.0)
                    .with_secondary(SecondaryProperty::ThermalExpansion, 17.0)],
            ),
            MaterialCategory::new(
                "PI_REINFORCEMENT",
                "PI reinforcement",
                vec![MaterialRecord::new("UPILEX-S", 25.0, 3.5, 0.001, "UBE")
                    .with_secondary(SecondaryProperty::YoungModulus, 3.2)
                    .with_secondary(SecondaryProperty::AbsorptionRate, 1.2)
                    .with_secondary(SecondaryProperty::ThermalConductivity, 0.29)
                    .with_secondary(SecondaryProperty::ThermalExpansion, 12.0)],
            ),
        ])
    }

    #[test]
    fn resolve_finds_exact_match() {
        let materials = materials();
        let resolver = Resolver::new(&materials);
        let record = resolver.resolve("Cu", "MITSUI LD").unwrap();
        assert_eq!(record.manufacturer, "Mitsui");
    }

    #[test]
    fn resolve_distinguishes_missing_category_from_missing_material() {
        let materials = materials();
        let resolver = Resolver::new(&materials);
        assert_eq!(
            resolver.resolve("Au", "MITSUI LD"),
            Err(StackupError::category_not_found("Au"))
        );
        assert_eq!(
            resolver.resolve("Cu", "MITSUI"),
            Err(StackupError::material_not_found("Cu", "MITSUI"))
        );
    }

    #[test]
    fn resolve_layer_carries_index() {
        let materials = materials();
        let resolver = Resolver::new(&materials);
        let layer = Layer::new("Cu", "nope");
        let issue = resolver.resolve_layer(7, &layer).unwrap_err();
        assert_eq!(issue.index, 7);
        assert!(issue.error.is_not_found());

        let good = Layer::new("Cu", "MITSUI LD");
        let resolved = resolver.resolve_layer(2, &good).unwrap();
        assert_eq!(resolved.index, 2);
        assert_eq!(resolved.category_name, "Copper");
    }

    #[test]
    fn validation_reports_every_failing_layer() {
        let materials = materials();
        let resolver = Resolver::new(&materials);
        let template = StackupTemplate::new(
            "T",
            "T",
            vec![
                Layer::new("Cu", "MITSUI LD"),
                Layer::new("GLASS", "E-glass"),
                Layer::new("Cu", "MITSUI LD"),
                Layer::new("Cu", "Furukawa"),
            ],
        );

        let result = resolver.validate_template(&template);
        assert!(!result.is_valid());
        let indices: Vec<usize> = result.errors.iter().map(|e| e.index).collect();
        assert_eq!(indices, [1, 3]);
    }

    #[test]
    fn missing_optional_property_is_only_a_warning() {
        let materials = materials();
        let resolver = Resolver::new(&materials);
        let template = StackupTemplate::new(
            "T",
            "T",
            vec![
                Layer::new("Cu", "MITSUI LD"),
                Layer::new("PI_REINFORCEMENT", "UPILEX-S"),
            ],
        );

        let result = resolver.validate_template(&template);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].index, 1);
        assert_eq!(result.warnings[0].property, SecondaryProperty::PeelStrength);
        assert_eq!(
            result.warnings[0].to_string(),
            "layer 2: material 'UPILEX-S' has no peel_strength value"
        );
    }
}
