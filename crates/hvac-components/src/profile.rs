//! Duct cross-sections and materials.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, ComponentResult};
use hvac_core::units::sq_in_to_sq_ft;

/// Cross-section shape of a duct or port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Round,
    Rectangular,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Round => write!(f, "round"),
            Shape::Rectangular => write!(f, "rectangular"),
        }
    }
}

/// Cross-section with dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DuctProfile {
    Round { diameter: f64 },
    Rectangular { width: f64, height: f64 },
}

impl DuctProfile {
    pub fn round(diameter: f64) -> Self {
        DuctProfile::Round { diameter }
    }

    pub fn rectangular(width: f64, height: f64) -> Self {
        DuctProfile::Rectangular { width, height }
    }

    pub fn shape(&self) -> Shape {
        match self {
            DuctProfile::Round { .. } => Shape::Round,
            DuctProfile::Rectangular { .. } => Shape::Rectangular,
        }
    }

    /// Cross-sectional area in square inches.
    pub fn area(&self) -> f64 {
        match *self {
            DuctProfile::Round { diameter } => std::f64::consts::PI * diameter * diameter / 4.0,
            DuctProfile::Rectangular { width, height } => width * height,
        }
    }

    /// Cross-sectional area in square feet.
    pub fn area_sq_ft(&self) -> f64 {
        sq_in_to_sq_ft(self.area())
    }

    /// Hydraulic diameter (4A/P) in inches.
    pub fn hydraulic_diameter(&self) -> f64 {
        match *self {
            DuctProfile::Round { diameter } => diameter,
            DuctProfile::Rectangular { width, height } => {
                if width + height <= 0.0 {
                    0.0
                } else {
                    2.0 * width * height / (width + height)
                }
            }
        }
    }

    /// Reject zero, negative or non-finite dimensions.
    pub fn validate(&self) -> ComponentResult<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        let valid = match *self {
            DuctProfile::Round { diameter } => ok(diameter),
            DuctProfile::Rectangular { width, height } => ok(width) && ok(height),
        };
        if valid {
            Ok(())
        } else {
            Err(ComponentError::InvalidArg {
                what: "duct dimensions must be positive and finite",
            })
        }
    }
}

impl fmt::Display for DuctProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuctProfile::Round { diameter } => write!(f, "{diameter}\" round"),
            DuctProfile::Rectangular { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

/// Duct wall material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DuctMaterial {
    #[default]
    GalvanizedSteel,
    Aluminum,
    StainlessSteel,
    BlackSteel,
    FiberglassDuctBoard,
    Flexible,
    Pvc,
}

impl DuctMaterial {
    /// Absolute wall roughness in feet.
    pub fn roughness_ft(&self) -> f64 {
        match self {
            DuctMaterial::GalvanizedSteel => 0.0005,
            DuctMaterial::Aluminum => 0.00015,
            DuctMaterial::StainlessSteel => 0.00015,
            DuctMaterial::BlackSteel => 0.00015,
            DuctMaterial::FiberglassDuctBoard => 0.003,
            DuctMaterial::Flexible => 0.003,
            DuctMaterial::Pvc => 0.00003,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangular_area_and_hydraulic_diameter() {
        let p = DuctProfile::rectangular(12.0, 8.0);
        assert_eq!(p.area(), 96.0);
        assert!((p.hydraulic_diameter() - 9.6).abs() < 1e-12);
        assert_eq!(p.shape(), Shape::Rectangular);
    }

    #[test]
    fn square_foot_section_is_exact() {
        assert_eq!(DuctProfile::rectangular(12.0, 12.0).area_sq_ft(), 1.0);
    }

    #[test]
    fn round_hydraulic_diameter_is_diameter() {
        let p = DuctProfile::round(10.0);
        assert_eq!(p.hydraulic_diameter(), 10.0);
        assert!((p.area() - 78.539_816).abs() < 1e-5);
    }

    #[test]
    fn validate_rejects_bad_dimensions() {
        assert!(DuctProfile::round(0.0).validate().is_err());
        assert!(DuctProfile::rectangular(12.0, f64::NAN).validate().is_err());
        assert!(DuctProfile::rectangular(12.0, 8.0).validate().is_ok());
    }

    #[test]
    fn flexible_is_rougher_than_galvanized() {
        assert!(DuctMaterial::Flexible.roughness_ft() > DuctMaterial::GalvanizedSteel.roughness_ft());
    }
}
