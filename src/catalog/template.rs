//! Layer references and named reference stackups.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One position in a stack: a reference to a material by category and name.
///
/// A layer never carries material data of its own. Properties are looked up
/// through the catalog each time they are needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layer {
    /// Category key, e.g. `"Cu"`.
    pub category: String,

    /// Material name within the category.
    pub material: String,

    /// Free-text label ("signal layer", "ground", ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Layer {
    /// Creates a layer reference without a description.
    #[must_use]
    pub fn new(category: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            material: material.into(),
            description: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A published electrical target of a reference stackup (impedance, loss, ...).
///
/// Carried through untouched; nothing in the crate interprets these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElectricalParam {
    /// Nominal value.
    pub value: f64,

    /// Unit label ("ohm", "dB/inch", "µm").
    #[serde(default)]
    pub unit: String,

    /// Tolerance, in the same unit as `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,

    /// Frequency the value was characterised at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

/// A named, pre-built stack definition.
///
/// Templates are static. Loading one into a [`crate::stackup::LayerStack`]
/// copies its layer references; the template itself is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackupTemplate {
    /// Stable identifier, e.g. `"TYPE-A"`.
    pub id: String,

    /// Human name.
    pub name: String,

    /// Longer description.
    #[serde(default)]
    pub description: String,

    /// Display grouping ("RF", "high-speed differential", ...). Unrelated to
    /// material categories.
    #[serde(default)]
    pub category: String,

    /// Layer references, top to bottom.
    pub layers: Vec<Layer>,

    /// Published electrical targets, in document order.
    #[serde(default, alias = "electricalParams")]
    pub electrical_params: IndexMap<String, ElectricalParam>,
}

impl StackupTemplate {
    /// Creates a template with no description or electrical parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            layers,
            electrical_params: IndexMap::new(),
        }
    }

    /// Case-insensitive substring match over name, display category and
    /// description. An empty term matches everything.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.name, &self.category, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_description_is_optional() {
        let json = r#"{ "category": "Cu", "material": "MITSUI LD" }"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer, Layer::new("Cu", "MITSUI LD"));
    }

    #[test]
    fn layer_rejects_unknown_keys() {
        let json = r#"{ "category": "Cu", "materal": "MITSUI LD" }"#;
        assert!(serde_json::from_str::<Layer>(json).is_err());
    }

    #[test]
    fn template_search_is_case_insensitive() {
        let mut template = StackupTemplate::new("TYPE-D", "RF FPC stackup", Vec::new());
        template.category = "Radio".to_string();
        template.description = "Low loss, tight impedance".to_string();

        assert!(template.matches("rf"));
        assert!(template.matches("RADIO"));
        assert!(template.matches("impedance"));
        assert!(template.matches(""));
        assert!(!template.matches("differential"));
    }

    #[test]
    fn electrical_params_keep_document_order() {
        let json = r#"{
            "id": "T",
            "name": "T",
            "layers": [],
            "electrical_params": {
                "insertion_loss": { "value": 0.35, "unit": "dB/inch", "frequency": "20GHz" },
                "impedance": { "value": 50, "tolerance": 3, "unit": "ohm" }
            }
        }"#;
        let template: StackupTemplate = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = template.electrical_params.keys().map(String::as_str).collect();
        assert_eq!(keys, ["insertion_loss", "impedance"]);
        assert_eq!(template.electrical_params["impedance"].tolerance, Some(3.0));
    }
}
