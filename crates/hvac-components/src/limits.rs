//! Engineering limits checked after each node calculation.

use serde::{Deserialize, Serialize};

use crate::flow::FlowProperties;

/// Velocity and pressure bounds (SMACNA-style defaults for low-pressure supply duct).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLimits {
    /// FPM; above this the duct is noisy.
    pub max_velocity: f64,
    /// FPM; below this (with flow) air distribution suffers.
    pub min_velocity: f64,
    /// in. w.g. per element.
    pub max_pressure_drop: f64,
    /// in. w.g. along any source-to-terminal path.
    pub max_system_pressure: f64,
}

impl Default for FlowLimits {
    fn default() -> Self {
        Self {
            max_velocity: 2500.0,
            min_velocity: 300.0,
            max_pressure_drop: 0.5,
            max_system_pressure: 6.0,
        }
    }
}

/// Findings from a limit check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitCheck {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl LimitCheck {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl FlowLimits {
    pub fn check(&self, flow: &FlowProperties) -> LimitCheck {
        let mut check = LimitCheck::default();

        if flow.airflow < 0.0 {
            check
                .errors
                .push(format!("Negative airflow: {:.1} CFM", flow.airflow));
        }

        if flow.velocity > self.max_velocity {
            check.warnings.push(format!(
                "High velocity: {:.0} FPM exceeds {:.0} FPM limit",
                flow.velocity, self.max_velocity
            ));
        } else if flow.airflow > 0.0 && flow.velocity < self.min_velocity {
            check.warnings.push(format!(
                "Low velocity: {:.0} FPM below {:.0} FPM, poor air distribution",
                flow.velocity, self.min_velocity
            ));
        }

        if flow.pressure_drop > self.max_pressure_drop {
            check.warnings.push(format!(
                "High pressure drop: {:.3} in. w.g. exceeds {:.2} in. w.g. limit",
                flow.pressure_drop, self.max_pressure_drop
            ));
        }

        check
    }
}
