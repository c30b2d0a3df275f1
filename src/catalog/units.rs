//! Thickness units.
//!
//! Every thickness held by the catalog is in micrometres. Catalog documents
//! declare the unit their numbers are written in and are converted on load;
//! display code converts back out with [`ThicknessUnit::from_micrometres`].

use std::fmt;

/// Smallest plausible layer thickness after conversion, in micrometres.
pub const MIN_PLAUSIBLE_THICKNESS_UM: f64 = 0.1;

/// Largest plausible layer thickness after conversion, in micrometres.
///
/// Flexible circuit films and laminates stay well under a centimetre, so a
/// value above this almost always means the document mixed up mm and µm.
pub const MAX_PLAUSIBLE_THICKNESS_UM: f64 = 10_000.0;

/// Unit a thickness value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThicknessUnit {
    /// Micrometres (µm). The canonical unit.
    #[default]
    Micrometre,

    /// Millimetres (mm).
    Millimetre,
}

impl ThicknessUnit {
    /// Parses a unit from a string.
    ///
    /// Accepts: "um", "µm", "micron", "micrometre", "micrometer", "mm",
    /// "millimetre", "millimeter" (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "um" | "µm" | "μm" | "micron" | "microns" | "micrometre" | "micrometer" => {
                Some(Self::Micrometre)
            }
            "mm" | "millimetre" | "millimeter" => Some(Self::Millimetre),
            _ => None,
        }
    }

    /// Number of micrometres in one of this unit.
    #[must_use]
    pub const fn micrometres_per_unit(self) -> f64 {
        match self {
            Self::Micrometre => 1.0,
            Self::Millimetre => 1000.0,
        }
    }

    /// Converts a value in this unit to micrometres.
    #[must_use]
    pub fn to_micrometres(self, value: f64) -> f64 {
        value * self.micrometres_per_unit()
    }

    /// Converts a value in micrometres to this unit.
    #[must_use]
    pub fn from_micrometres(self, value_um: f64) -> f64 {
        value_um / self.micrometres_per_unit()
    }

    /// Short symbol used in tables and headers.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Micrometre => "µm",
            Self::Millimetre => "mm",
        }
    }
}

impl fmt::Display for ThicknessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Returns `true` if a thickness in micrometres is finite and inside the
/// plausible window for a flexible circuit layer.
#[must_use]
pub fn is_plausible_thickness(value_um: f64) -> bool {
    value_um.is_finite()
        && (MIN_PLAUSIBLE_THICKNESS_UM..=MAX_PLAUSIBLE_THICKNESS_UM).contains(&value_um)
}
