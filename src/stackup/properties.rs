//! Derived stack properties.
//!
//! Effective Dk and Df are thickness-weighted arithmetic means over the
//! layers:
//!
//! ```text
//! total      = Σ tᵢ
//! effective  = Σ (vᵢ · tᵢ / total)
//! ```
//!
//! This is the parallel-plate approximation: it treats the layers as
//! capacitors sharing one field direction. It is not a multilayer
//! transmission-line model; use it for comparing stackups, not for impedance
//! sign-off.
//!
//! Secondary properties use the same weighting, but only over layers whose
//! material has a value. A layer with no value is dropped from both numerator
//! and denominator rather than counted as zero.

use serde::Serialize;

use super::error::{StackupError, StackupResult};
use super::resolver::ResolvedLayer;
use super::stack::LayerStack;
use crate::catalog::{MaterialRecord, SecondaryProperty};

/// Aggregate properties of a stack, computed from a snapshot.
///
/// Never stored; recompute after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedProperties {
    /// Number of layers the values were computed from.
    pub layer_count: usize,

    /// Sum of layer thicknesses, in micrometres.
    pub total_thickness: f64,

    /// Thickness-weighted dielectric constant.
    pub effective_dk: f64,

    /// Thickness-weighted dissipation factor.
    pub effective_df: f64,

    /// Thickness-weighted Young's modulus over layers that have one.
    pub young_modulus: Option<f64>,

    /// Thickness-weighted peel strength over layers that have one.
    pub peel_strength: Option<f64>,

    /// Thickness-weighted absorption rate over layers that have one.
    pub absorption_rate: Option<f64>,

    /// Thickness-weighted thermal conductivity over layers that have one.
    pub thermal_conductivity: Option<f64>,

    /// Thickness-weighted thermal expansion over layers that have one.
    pub thermal_expansion: Option<f64>,
}

impl DerivedProperties {
    /// Computes the properties of `layers`, taken in the given order.
    ///
    /// # Errors
    ///
    /// [`StackupError::Inconsistent`] if the total thickness is not a positive
    /// finite number. That cannot happen for a non-empty stack built from a
    /// loaded catalog, so seeing it means an invariant was broken upstream.
    pub fn from_layers(layers: &[ResolvedLayer<'_>]) -> StackupResult<Self> {
        let total_thickness: f64 = layers.iter().map(|l| l.material.thickness).sum();
        if !(total_thickness.is_finite() && total_thickness > 0.0) {
            return Err(StackupError::inconsistent(format!(
                "total thickness of {} layer(s) is {total_thickness}",
                layers.len()
            )));
        }

        let weighted = |value: fn(&MaterialRecord) -> f64| -> f64 {
            layers
                .iter()
                .map(|l| value(l.material) * l.material.thickness / total_thickness)
                .sum()
        };
        let secondary = |property| weighted_mean_present(layers, property);

        Ok(Self {
            layer_count: layers.len(),
            total_thickness,
            effective_dk: weighted(|m| m.dk),
            effective_df: weighted(|m| m.df),
            young_modulus: secondary(SecondaryProperty::YoungModulus),
            peel_strength: secondary(SecondaryProperty::PeelStrength),
            absorption_rate: secondary(SecondaryProperty::AbsorptionRate),
            thermal_conductivity: secondary(SecondaryProperty::ThermalConductivity),
            thermal_expansion: secondary(SecondaryProperty::ThermalExpansion),
        })
    }

    /// Returns a secondary property average by enum.
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
}

/// Computes the derived properties of a stack's current layers.
///
/// # Errors
///
/// See [`DerivedProperties::from_layers`].
pub fn compute_derived_properties(stack: &LayerStack) -> StackupResult<DerivedProperties> {
    stack.derived_properties()
}

/// Thickness-weighted mean of `property` over the layers that have a value.
fn weighted_mean_present(layers: &[ResolvedLayer<'_>], property: SecondaryProperty) -> Option<f64> {
    let (sum, weight) = layers
        .iter()
        .filter_map(|l| {
            l.material
                .secondary(property)
                .map(|v| (v, l.material.thickness))
        })
        .fold((0.0, 0.0), |(sum, weight), (v, t)| (sum + v * t, weight + t));

    // `weight` is zero only when no layer carried the property.
    (weight > 0.0).then(|| sum / weight)
}
