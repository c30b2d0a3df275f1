//! Material records and the category-keyed material table.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One physical material variant.
///
/// `thickness` is always in micrometres once the record is inside a
/// [`MaterialCatalog`]. Optional properties are `None` when they do not apply
/// to the material (peel strength of a reinforcement film, for example),
/// never zero.
///
/// Unknown keys are rejected so that a misspelled property cannot load as
/// absent. The camelCase spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialRecord {
    /// Model name, unique within its category.
    pub name: String,

    /// Thickness in micrometres.
    pub thickness: f64,

    /// Dielectric constant.
    pub dk: f64,

    /// Dissipation (loss) factor.
    pub df: f64,

    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: String,

    /// Display colour (`#RRGGBB`). Not used by any calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Young's modulus (GPa).
    #[serde(default, alias = "youngModulus")]
    pub young_modulus: Option<f64>,

    /// Peel strength (N/mm).
    #[serde(default, alias = "peelStrength")]
    pub peel_strength: Option<f64>,

    /// Manufacturing date as written in the source catalog.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "manufacturingDate")]
    pub manufacturing_date: Option<String>,

    /// Testing date as written in the source catalog.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "testingDate")]
    pub testing_date: Option<String>,

    /// Moisture absorption rate (%).
    #[serde(default, alias = "absorptionRate")]
    pub absorption_rate: Option<f64>,

    /// Thermal conductivity (W/m·K).
    #[serde(default, alias = "thermalConductivity")]
    pub thermal_conductivity: Option<f64>,

    /// Coefficient of thermal expansion (ppm/°C).
    #[serde(default, alias = "thermalExpansion")]
    pub thermal_expansion: Option<f64>,
}

impl MaterialRecord {
    /// Creates a record with the required properties and no optional ones.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        thickness_um: f64,
        dk: f64,
        df: f64,
        manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            thickness: thickness_um,
            dk,
            df,
            manufacturer: manufacturer.into(),
            color: None,
            young_modulus: None,
            peel_strength: None,
            manufacturing_date: None,
            testing_date: None,
            absorption_rate: None,
            thermal_conductivity: None,
            thermal_expansion: None,
        }
    }

    /// Returns the value of a secondary property, if the material has one.
    #[must_use]
    pub const fn secondary(&self, property: SecondaryProperty) -> Option<f64> {
        match property {
            SecondaryProperty::YoungModulus => self.young_modulus,
            SecondaryProperty::PeelStrength => self.peel_strength,
            SecondaryProperty::AbsorptionRate => self.absorption_rate,
            SecondaryProperty::ThermalConductivity => self.thermal_conductivity,
            SecondaryProperty::ThermalExpansion => self.thermal_expansion,
        }
    }

    /// Sets a secondary property.
    #[must_use]
    pub fn with_secondary(mut self, property: SecondaryProperty, value: f64) -> Self {
        let slot = match property {
            SecondaryProperty::YoungModulus => &mut self.young_modulus,
            SecondaryProperty::PeelStrength => &mut self.peel_strength,
            SecondaryProperty::AbsorptionRate => &mut self.absorption_rate,
            SecondaryProperty::ThermalConductivity => &mut self.thermal_conductivity,
            SecondaryProperty::ThermalExpansion => &mut self.thermal_expansion,
        };
        *slot = Some(value);
        self
    }
}

/// Optional material properties that are averaged across a stack when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecondaryProperty {
    /// Young's modulus.
    YoungModulus,
    /// Peel strength.
    PeelStrength,
    /// Moisture absorption rate.
    AbsorptionRate,
    /// Thermal conductivity.
    ThermalConductivity,
    /// Coefficient of thermal expansion.
    ThermalExpansion,
}

impl SecondaryProperty {
    /// All secondary properties, in display order.
    pub const ALL: [Self; 5] = [
        Self::YoungModulus,
        Self::PeelStrength,
        Self::AbsorptionRate,
        Self::ThermalConductivity,
        Self::ThermalExpansion,
    ];

    /// Canonical snake_case key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::YoungModulus => "young_modulus",
            Self::PeelStrength => "peel_strength",
            Self::AbsorptionRate => "absorption_rate",
            Self::ThermalConductivity => "thermal_conductivity",
            Self::ThermalExpansion => "thermal_expansion",
        }
    }
}

impl fmt::Display for SecondaryProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named group of materials sharing a physical role ("FCCL", "PTFE", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCategory {
    /// Stable identifier, e.g. `"PI_REINFORCEMENT"`.
    pub key: String,

    /// Human label.
    pub display_name: String,

    /// Materials in catalog order.
    pub materials: Vec<MaterialRecord>,
}

impl MaterialCategory {
    /// Creates a category.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        materials: Vec<MaterialRecord>,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            materials,
        }
    }

    /// Looks up a material by exact name.
    #[must_use]
    pub fn material(&self, name: &str) -> Option<&MaterialRecord> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// The first material in catalog order.
    #[must_use]
    pub fn first_material(&self) -> Option<&MaterialRecord> {
        self.materials.first()
    }
}

/// Category key → category, in catalog order.
///
/// Built once by the catalog loader and never mutated afterwards, so it can
/// be shared freely between design sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterialCatalog {
    categories: IndexMap<String, MaterialCategory>,
}

impl MaterialCatalog {
    /// Builds a catalog from categories, keyed by each category's `key`.
    ///
    /// No validation happens here; use the loader in [`crate::catalog`] for
    /// untrusted data.
    #[must_use]
    pub fn from_categories(categories: impl IntoIterator<Item = MaterialCategory>) -> Self {
        Self {
            categories: categories
                .into_iter()
                .map(|c| (c.key.clone(), c))
                .collect(),
        }
    }

    /// Returns the number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns `true` if the catalog has no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of materials across every category.
    #[must_use]
    pub fn material_count(&self) -> usize {
        self.categories.values().map(|c| c.materials.len()).sum()
    }

    /// Returns a category by key.
    #[must_use]
    pub fn category(&self, key: &str) -> Option<&MaterialCategory> {
        self.categories.get(key)
    }

    /// Returns a material by category key and exact material name.
    #[must_use]
    pub fn material(&self, category: &str, name: &str) -> Option<&MaterialRecord> {
        self.category(category)?.material(name)
    }

    /// Iterates categories in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = &MaterialCategory> {
        self.categories.values()
    }

    /// Category keys in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// The first category in catalog order.
    #[must_use]
    pub fn first_category(&self) -> Option<&MaterialCategory> {
        self.categories.values().next()
    }
}
