//! Calculation engine settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use hvac_components::calculator::DEFAULT_FALLBACK_VELOCITY;
use hvac_components::{AirProperties, FlowLimits, LossCoefficients};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Quiet period after the last trigger before a pass runs.
    pub debounce_ms: u64,
    pub limits: FlowLimits,
    pub air: AirProperties,
    pub coefficients: LossCoefficients,
    /// FPM used to estimate airflow for elements with nothing upstream and
    /// no design airflow.
    pub fallback_velocity: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            limits: FlowLimits::default(),
            air: AirProperties::default(),
            coefficients: LossCoefficients::default(),
            fallback_velocity: DEFAULT_FALLBACK_VELOCITY,
        }
    }
}

impl CalculationConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
