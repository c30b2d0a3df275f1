//! Catalog document parsing and load-time validation.
//!
//! A catalog document is JSON of the form:
//!
//! ```text
//! {
//!   "version": "1.1",
//!   "thickness_unit": "mm",
//!   "categories": {
//!     "<key>": { "display_name": "...", "materials": [ { "name": ..., "thickness": ..., ... } ] }
//!   },
//!   "stackups": [ { "id": ..., "name": ..., "layers": [ { "category": ..., "material": ... } ] } ]
//! }
//! ```
//!
//! Every thickness is written in the declared unit and converted to
//! micrometres here. Nothing partially loaded ever escapes this module.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::material::{MaterialCatalog, MaterialCategory, MaterialRecord};
use super::template::StackupTemplate;
use super::units::{is_plausible_thickness, ThicknessUnit};
use super::Catalog;
use crate::error::CatalogError;
use crate::stackup::Resolver;

/// Root of a catalog document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    #[serde(default)]
    version: Option<String>,

    thickness_unit: String,

    categories: IndexMap<String, CategoryDocument>,

    #[serde(default)]
    stackups: Vec<StackupTemplate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryDocument {
    #[serde(default)]
    display_name: Option<String>,

    materials: Vec<MaterialRecord>,
}

/// Parses and validates a catalog document.
pub(super) fn parse(json: &str, origin: &str) -> Result<Catalog, CatalogError> {
    let document: CatalogDocument =
        serde_json::from_str(json).map_err(|source| CatalogError::ParseError {
            origin: origin.to_string(),
            source,
        })?;
    build(document)
}

/// Validates typed parts whose thickness values are already in micrometres.
pub(super) fn from_parts(
    materials: &MaterialCatalog,
    templates: Vec<StackupTemplate>,
) -> Result<Catalog, CatalogError> {
    let categories = materials
        .categories()
        .map(|c| {
            let document = CategoryDocument {
                display_name: Some(c.display_name.clone()),
                materials: c.materials.clone(),
            };
            (c.key.clone(), document)
        })
        .collect();
    build(CatalogDocument {
        _schema: None,
        version: None,
        thickness_unit: "um".to_string(),
        categories,
        stackups: templates,
    })
}

fn build(document: CatalogDocument) -> Result<Catalog, CatalogError> {
    let unit = ThicknessUnit::from_str_loose(&document.thickness_unit).ok_or_else(|| {
        CatalogError::UnknownThicknessUnit {
            unit: document.thickness_unit.clone(),
        }
    })?;

    if document.categories.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut categories = Vec::with_capacity(document.categories.len());
    for (key, category) in document.categories {
        let materials = convert_materials(&key, category.materials, unit)?;
        let display_name = category.display_name.unwrap_or_else(|| key.clone());
        categories.push(MaterialCategory::new(key, display_name, materials));
    }
    let materials = MaterialCatalog::from_categories(categories);

    validate_templates(&materials, &document.stackups)?;

    debug!(
        categories = materials.len(),
        materials = materials.material_count(),
        templates = document.stackups.len(),
        unit = %unit,
        "Catalog validated"
    );

    Ok(Catalog {
        version: document.version,
        materials: Arc::new(materials),
        templates: document.stackups,
    })
}

fn convert_materials(
    category: &str,
    records: Vec<MaterialRecord>,
    unit: ThicknessUnit,
) -> Result<Vec<MaterialRecord>, CatalogError> {
    if records.is_empty() {
        return Err(CatalogError::EmptyCategory {
            category: category.to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(records.len());
    let mut converted = Vec::with_capacity(records.len());
    for mut record in records {
        if !seen.insert(record.name.clone()) {
            return Err(CatalogError::DuplicateMaterial {
                category: category.to_string(),
                material: record.name,
            });
        }

        let invalid = |message: String| CatalogError::InvalidMaterial {
            category: category.to_string(),
            material: record.name.clone(),
            message,
        };

        let thickness_um = unit.to_micrometres(record.thickness);
        if !is_plausible_thickness(thickness_um) {
            return Err(invalid(format!(
                "thickness {} {unit} is {thickness_um} µm, outside the plausible range; \
                 check the declared thickness unit",
                record.thickness
            )));
        }
        if !record.dk.is_finite() || record.dk < 0.0 {
            return Err(invalid(format!("dk must be a non-negative number, got {}", record.dk)));
        }
        if !record.df.is_finite() || record.df < 0.0 {
            return Err(invalid(format!("df must be a non-negative number, got {}", record.df)));
        }

        record.thickness = thickness_um;
        converted.push(record);
    }
    Ok(converted)
}

fn validate_templates(
    materials: &MaterialCatalog,
    templates: &[StackupTemplate],
) -> Result<(), CatalogError> {
    let resolver = Resolver::new(materials);
    let mut ids = HashSet::with_capacity(templates.len());

    for template in templates {
        if !ids.insert(template.id.as_str()) {
            return Err(CatalogError::DuplicateTemplate {
                id: template.id.clone(),
            });
        }

        if template.layers.is_empty() {
            return Err(CatalogError::InvalidTemplate {
                id: template.id.clone(),
                errors: vec!["template has no layers".to_string()],
            });
        }

        let validation = resolver.validate_template(template);
        for warning in &validation.warnings {
            debug!(template = %template.id, "{warning}");
        }
        if !validation.is_valid() {
            return Err(CatalogError::InvalidTemplate {
                id: template.id.clone(),
                errors: validation.errors.iter().map(ToString::to_string).collect(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "thickness_unit": "mm",
        "categories": {
            "Cu": {
                "display_name": "Copper",
                "materials": [
                    { "name": "MITSUI LD", "thickness": 0.035, "dk": 1, "df": 0, "manufacturer": "Mitsui" }
                ]
            }
        },
        "stackups": [
            { "id": "ONE", "name": "One", "layers": [ { "category": "Cu", "material": "MITSUI LD" } ] }
        ]
    }"#;

    #[test]
    fn converts_millimetres_to_micrometres() {
        let catalog = parse(MINIMAL, "<test>").unwrap();
        let cu = catalog.materials().material("Cu", "MITSUI LD").unwrap();
        assert!((cu.thickness - 35.0).abs() < 1e-9);
        assert_eq!(catalog.materials().category("Cu").unwrap().display_name, "Copper");
    }

    #[test]
    fn rejects_unit_mismatch() {
        let json = MINIMAL.replace(r#""thickness_unit": "mm""#, r#""thickness_unit": "um""#);
        let err = parse(&json, "<test>").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidMaterial { .. }), "{err}");
    }

    #[test]
    fn rejects_unknown_unit() {
        let json = MINIMAL.replace(r#""thickness_unit": "mm""#, r#""thickness_unit": "mil""#);
        let err = parse(&json, "<test>").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownThicknessUnit { .. }));
    }

    #[test]
    fn rejects_duplicate_material_names() {
        let json = r#"{
            "thickness_unit": "um",
            "categories": {
                "Cu": { "materials": [
                    { "name": "A", "thickness": 35, "dk": 1, "df": 0 },
                    { "name": "A", "thickness": 18, "dk": 1, "df": 0 }
                ] }
            }
        }"#;
        let err = parse(json, "<test>").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateMaterial { .. }));
    }

    #[test]
    fn rejects_empty_category() {
        let json = r#"{
            "thickness_unit": "um",
            "categories": { "Cu": { "materials": [] } }
        }"#;
        let err = parse(json, "<test>").unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCategory { .. }));
    }

    #[test]
    fn rejects_negative_df() {
        let json = r#"{
            "thickness_unit": "um",
            "categories": { "Cu": { "materials": [
                { "name": "A", "thickness": 35, "dk": 1, "df": -0.1 }
            ] } }
        }"#;
        let err = parse(json, "<test>").unwrap_err();
        assert!(err.to_string().contains("df"));
    }

    #[test]
    fn rejects_unresolvable_template() {
        let json = MINIMAL.replace(
            r#""material": "MITSUI LD" } ] }"#,
            r#""material": "MITSUI LD" }, { "category": "PTFE", "material": "RO3003" } ] }"#,
        );
        let err = parse(&json, "<test>").unwrap_err();
        match err {
            CatalogError::InvalidTemplate { id, errors } => {
                assert_eq!(id, "ONE");
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("layer 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_template_without_layers() {
        let json = MINIMAL.replace(
            r#"[ { "category": "Cu", "material": "MITSUI LD" } ]"#,
            "[]",
        );
        let err = parse(&json, "<test>").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTemplate { ref id, .. } if id == "ONE"));
    }

    #[test]
    fn rejects_misspelled_material_field() {
        let json = MINIMAL.replace(
            r#""manufacturer": "Mitsui" }"#,
            r#""manufacturer": "Mitsui", "thermal_expnasion": 40 }"#,
        );
        let err = parse(&json, "<test>").unwrap_err();
        assert!(matches!(err, CatalogError::ParseError { .. }), "{err}");
        assert!(err.to_string().contains("<test>"));
    }

    #[test]
    fn accepts_camel_case_material_fields() {
        let json = MINIMAL.replace(
            r#""manufacturer": "Mitsui" }"#,
            r#""manufacturer": "Mitsui", "peelStrength": 1.2 }"#,
        );
        let catalog = parse(&json, "<test>").unwrap();
        let cu = catalog.materials().material("Cu", "MITSUI LD").unwrap();
        assert_eq!(cu.peel_strength, Some(1.2));
    }

    #[test]
    fn display_name_defaults_to_key() {
        let json = r#"{
            "thickness_unit": "um",
            "categories": { "EMI": { "materials": [
                { "name": "SF-PC5", "thickness": 25, "dk": 4.5, "df": 0.025 }
            ] } }
        }"#;
        let catalog = parse(json, "<test>").unwrap();
        assert_eq!(catalog.materials().category("EMI").unwrap().display_name, "EMI");
        assert!(catalog.templates().is_empty());
    }
}
