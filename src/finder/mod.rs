//! Catalog browsing: category selection, field projection and sorting.
//!
//! All three steps are plain functions over the immutable catalog. The caller
//! owns the selection state (which categories, which fields, which order) and
//! passes it in on every call.
//!
//! ```
//! use fpc_stackup::catalog::Catalog;
//! use fpc_stackup::finder::{project, select_categories, sort_by, SortDirection};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let entries = select_categories(catalog.materials(), &["Cu", "PTFE"]);
//! let mut rows = project(&entries, &["name", "thickness", "dk"]);
//! sort_by(&mut rows, "thickness", SortDirection::Descending);
//! assert_eq!(rows[0].len(), 3);
//! ```

mod export;

pub use export::{default_export_file_name, CsvExport};

use std::cmp::Ordering;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::catalog::{MaterialCatalog, MaterialRecord, SecondaryProperty};

/// One projected row: canonical field key → value, in projection order.
pub type Row = IndexMap<String, FieldValue>;

/// A field that can be projected out of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialField {
    /// Display name of the owning category.
    Category,
    /// Key of the owning category.
    CategoryKey,
    /// Material model name.
    Name,
    /// Manufacturer.
    Manufacturer,
    /// Thickness in micrometres.
    Thickness,
    /// Dielectric constant.
    Dk,
    /// Dissipation factor.
    Df,
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
    /// Manufacturing date.
    ManufacturingDate,
    /// Testing date.
    TestingDate,
    /// Display colour.
    Color,
}

impl MaterialField {
    /// Every field, in default column order.
    pub const ALL: [Self; 15] = [
        Self::Category,
        Self::CategoryKey,
        Self::Name,
        Self::Manufacturer,
        Self::Thickness,
        Self::Dk,
        Self::Df,
        Self::YoungModulus,
        Self::PeelStrength,
        Self::AbsorptionRate,
        Self::ThermalConductivity,
        Self::ThermalExpansion,
        Self::ManufacturingDate,
        Self::TestingDate,
        Self::Color,
    ];

    /// The columns shown when the caller asks for none in particular.
    pub const DEFAULT_COLUMNS: [Self; 8] = [
        Self::Category,
        Self::Manufacturer,
        Self::Name,
        Self::Thickness,
        Self::Dk,
        Self::Df,
        Self::YoungModulus,
        Self::PeelStrength,
    ];

    /// Parses a field key.
    ///
    /// Accepts the canonical snake_case keys and the camelCase spellings used
    /// by front ends (`youngModulus`, `materialType`, ...). Case-sensitive
    /// apart from that.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let field = match s.trim() {
            "category" | "materialType" => Self::Category,
            "category_key" | "categoryKey" => Self::CategoryKey,
            "name" => Self::Name,
            "manufacturer" => Self::Manufacturer,
            "thickness" => Self::Thickness,
            "dk" => Self::Dk,
            "df" => Self::Df,
            "young_modulus" | "youngModulus" => Self::YoungModulus,
            "peel_strength" | "peelStrength" => Self::PeelStrength,
            "absorption_rate" | "absorptionRate" => Self::AbsorptionRate,
            "thermal_conductivity" | "thermalConductivity" => Self::ThermalConductivity,
            "thermal_expansion" | "thermalExpansion" => Self::ThermalExpansion,
            "manufacturing_date" | "manufacturingDate" => Self::ManufacturingDate,
            "testing_date" | "testingDate" => Self::TestingDate,
            "color" | "colour" => Self::Color,
            _ => return None,
        };
        Some(field)
    }

    /// Canonical row key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::CategoryKey => "category_key",
            Self::Name => "name",
            Self::Manufacturer => "manufacturer",
            Self::Thickness => "thickness",
            Self::Dk => "dk",
            Self::Df => "df",
            Self::YoungModulus => "young_modulus",
            Self::PeelStrength => "peel_strength",
            Self::AbsorptionRate => "absorption_rate",
            Self::ThermalConductivity => "thermal_conductivity",
            Self::ThermalExpansion => "thermal_expansion",
            Self::ManufacturingDate => "manufacturing_date",
            Self::TestingDate => "testing_date",
            Self::Color => "color",
        }
    }

    /// Column heading, without unit.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Material type",
            Self::CategoryKey => "Category key",
            Self::Name => "Model",
            Self::Manufacturer => "Manufacturer",
            Self::Thickness => "Thickness",
            Self::Dk => "Dk",
            Self::Df => "Df",
            Self::YoungModulus => "Young's modulus",
            Self::PeelStrength => "Peel strength",
            Self::AbsorptionRate => "Absorption rate",
            Self::ThermalConductivity => "Thermal conductivity",
            Self::ThermalExpansion => "Thermal expansion",
            Self::ManufacturingDate => "Manufacturing date",
            Self::TestingDate => "Testing date",
            Self::Color => "Colour",
        }
    }

    /// Unit of the projected value, if it has one.
    ///
    /// Thickness is projected in micrometres.
    #[must_use]
    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::Thickness => Some("µm"),
            Self::YoungModulus => Some("GPa"),
            Self::PeelStrength => Some("N/mm"),
            Self::AbsorptionRate => Some("%"),
            Self::ThermalConductivity => Some("W/m·K"),
            Self::ThermalExpansion => Some("ppm/°C"),
            _ => None,
        }
    }

    /// `true` for fields that project as numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Thickness
                | Self::Dk
                | Self::Df
                | Self::YoungModulus
                | Self::PeelStrength
                | Self::AbsorptionRate
                | Self::ThermalConductivity
                | Self::ThermalExpansion
        )
    }
}

impl From<SecondaryProperty> for MaterialField {
    fn from(property: SecondaryProperty) -> Self {
        match property {
            SecondaryProperty::YoungModulus => Self::YoungModulus,
            SecondaryProperty::PeelStrength => Self::PeelStrength,
            SecondaryProperty::AbsorptionRate => Self::AbsorptionRate,
            SecondaryProperty::ThermalConductivity => Self::ThermalConductivity,
            SecondaryProperty::ThermalExpansion => Self::ThermalExpansion,
        }
    }
}

impl fmt::Display for MaterialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A projected cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The material has no value for this field.
    Null,
    /// A numeric property.
    Number(f64),
    /// A text property.
    Text(String),
}

impl FieldValue {
    /// Total order used for sorting: `Null < Number < Text`.
    ///
    /// Numbers compare by IEEE total order, text lexicographically.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `true` for [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |s| Self::Text(s.to_string()))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            // f64's Display is the shortest string that round-trips.
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A material tagged with the category it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry<'a> {
    /// Owning category key.
    pub category_key: &'a str,
    /// Owning category display name.
    pub category_name: &'a str,
    /// The material itself.
    pub material: &'a MaterialRecord,
}

impl CatalogEntry<'_> {
    /// Reads one field.
    #[must_use]
    pub fn value(&self, field: MaterialField) -> FieldValue {
        let m = self.material;
        match field {
            MaterialField::Category => FieldValue::Text(self.category_name.to_string()),
            MaterialField::CategoryKey => FieldValue::Text(self.category_key.to_string()),
            MaterialField::Name => FieldValue::Text(m.name.clone()),
            MaterialField::Manufacturer => FieldValue::Text(m.manufacturer.clone()),
            MaterialField::Thickness => FieldValue::Number(m.thickness),
            MaterialField::Dk => FieldValue::Number(m.dk),
            MaterialField::Df => FieldValue::Number(m.df),
            MaterialField::YoungModulus => m.young_modulus.into(),
            MaterialField::PeelStrength => m.peel_strength.into(),
            MaterialField::AbsorptionRate => m.absorption_rate.into(),
            MaterialField::ThermalConductivity => m.thermal_conductivity.into(),
            MaterialField::ThermalExpansion => m.thermal_expansion.into(),
            MaterialField::ManufacturingDate => m.manufacturing_date.as_deref().into(),
            MaterialField::TestingDate => m.testing_date.as_deref().into(),
            MaterialField::Color => m.color.as_deref().into(),
        }
    }
}

/// Sort direction for [`sort_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first; nulls lead.
    #[default]
    Ascending,
    /// Largest first; nulls trail.
    Descending,
}

/// Flattens the materials of the requested categories.
///
/// Categories come out in the order requested, materials in catalog order
/// within each. Unknown keys are skipped and repeated keys count once.
#[must_use]
pub fn select_categories<'a, S: AsRef<str>>(
    catalog: &'a MaterialCatalog,
    keys: &[S],
) -> Vec<CatalogEntry<'a>> {
    let unique: IndexSet<&str> = keys.iter().map(AsRef::as_ref).collect();

    unique
        .into_iter()
        .filter_map(|key| catalog.category(key))
        .flat_map(|category| {
            category.materials.iter().map(move |material| CatalogEntry {
                category_key: &category.key,
                category_name: &category.display_name,
                material,
            })
        })
        .collect()
}

/// Projects entries onto the requested field keys.
///
/// Keys that do not name a field are ignored, as are repeats. Every row has
/// the same keys in the same order.
#[must_use]
pub fn project<S: AsRef<str>>(entries: &[CatalogEntry<'_>], field_keys: &[S]) -> Vec<Row> {
    let fields: Vec<MaterialField> = field_keys
        .iter()
        .filter_map(|k| MaterialField::from_str_loose(k.as_ref()))
        .collect();
    project_fields(entries, &fields)
}

/// Projects entries onto already-parsed fields.
#[must_use]
pub fn project_fields(entries: &[CatalogEntry<'_>], fields: &[MaterialField]) -> Vec<Row> {
    let fields: IndexSet<MaterialField> = fields.iter().copied().collect();

    entries
        .iter()
        .map(|entry| {
            fields
                .iter()
                .map(|&field| (field.key().to_string(), entry.value(field)))
                .collect()
        })
        .collect()
}

/// Sorts rows in place by one field.
///
/// The sort is stable: rows with equal keys keep their relative order in
/// both directions. A row without the key sorts as [`FieldValue::Null`].
/// `field_key` may be any spelling [`MaterialField::from_str_loose`] accepts.
pub fn sort_by(rows: &mut [Row], field_key: &str, direction: SortDirection) {
    let key = MaterialField::from_str_loose(field_key).map_or(field_key, |field| field.key());
    let cell = |row: &Row| row.get(key).cloned().unwrap_or(FieldValue::Null);

    rows.sort_by(|a, b| {
        let ordering = cell(a).total_cmp(&cell(b));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
