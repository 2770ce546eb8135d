//! Physical flow state of a node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hvac_core::units::constants::{
    STANDARD_AIR_DENSITY, STANDARD_AIR_KINEMATIC_VISCOSITY, STANDARD_AIR_TEMP_F,
};
use hvac_core::units::fahrenheit_to_kelvin;

/// Flow quantities computed for one node.
///
/// Always replaced as a whole by a calculation; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowProperties {
    /// CFM
    pub airflow: f64,
    /// FPM
    pub velocity: f64,
    /// in. w.g.
    pub pressure_drop: f64,
    /// in. w.g. per 100 ft
    pub friction_rate: f64,
    pub reynolds_number: f64,
    /// degrees F
    pub temperature: f64,
    /// lb/ft^3
    pub density: f64,
    pub is_calculated: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for FlowProperties {
    fn default() -> Self {
        Self::uncalculated(&AirProperties::default())
    }
}

impl FlowProperties {
    /// Zero flow at the given air state, not yet calculated.
    pub fn uncalculated(air: &AirProperties) -> Self {
        Self {
            airflow: 0.0,
            velocity: 0.0,
            pressure_drop: 0.0,
            friction_rate: 0.0,
            reynolds_number: 0.0,
            temperature: air.temperature,
            density: air.density,
            is_calculated: false,
            last_updated: None,
        }
    }
}

/// Air state used by all calculators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirProperties {
    /// degrees F
    pub temperature: f64,
    /// lb/ft^3
    pub density: f64,
    /// ft^2/s
    pub kinematic_viscosity: f64,
}

impl Default for AirProperties {
    fn default() -> Self {
        Self {
            temperature: STANDARD_AIR_TEMP_F,
            density: STANDARD_AIR_DENSITY,
            kinematic_viscosity: STANDARD_AIR_KINEMATIC_VISCOSITY,
        }
    }
}

impl AirProperties {
    /// Standard air re-densified for another dry-bulb temperature (ideal gas, same pressure).
    pub fn at_temperature(temperature_f: f64) -> Self {
        let std = Self::default();
        let ratio = fahrenheit_to_kelvin(std.temperature) / fahrenheit_to_kelvin(temperature_f);
        Self {
            temperature: temperature_f,
            density: std.density * ratio,
            kinematic_viscosity: std.kinematic_viscosity / ratio,
        }
    }

    /// Density relative to standard air; scales velocity pressure.
    pub fn density_ratio(&self) -> f64 {
        self.density / STANDARD_AIR_DENSITY
    }
}
