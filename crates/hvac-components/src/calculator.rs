//! Per-kind flow calculators.

use hvac_core::units::constants::velocity_pressure;
use hvac_core::units::in_to_ft;

use crate::coefficients::LossCoefficients;
use crate::common::{EPSILON_AIRFLOW, check_area, check_finite};
use crate::element::{DuctSegment, Equipment, Fitting, NetworkElement};
use crate::error::ComponentResult;
use crate::flow::{AirProperties, FlowProperties};
use crate::friction::{darcy_friction_factor, friction_rate, reynolds_number};

/// Inputs shared by every calculator.
#[derive(Debug, Clone, Copy)]
pub struct CalculationContext<'a> {
    /// Sum of the airflow of all upstream nodes, `None` if the node has no
    /// upstream connection (it is then treated as a flow source).
    pub upstream_airflow: Option<f64>,
    pub air: &'a AirProperties,
    pub coefficients: &'a LossCoefficients,
    /// FPM used to estimate airflow when nothing better is known.
    pub fallback_velocity: f64,
}

static STANDARD_AIR: AirProperties = AirProperties {
    temperature: hvac_core::units::constants::STANDARD_AIR_TEMP_F,
    density: hvac_core::units::constants::STANDARD_AIR_DENSITY,
    kinematic_viscosity: hvac_core::units::constants::STANDARD_AIR_KINEMATIC_VISCOSITY,
};

static DEFAULT_COEFFICIENTS: std::sync::LazyLock<LossCoefficients> =
    std::sync::LazyLock::new(LossCoefficients::default);

/// Estimated velocity used when an element has no upstream flow and no design airflow.
pub const DEFAULT_FALLBACK_VELOCITY: f64 = 1000.0;

impl CalculationContext<'static> {
    /// Standard air, default coefficient tables, no upstream flow.
    pub fn standard() -> Self {
        Self {
            upstream_airflow: None,
            air: &STANDARD_AIR,
            coefficients: &*DEFAULT_COEFFICIENTS,
            fallback_velocity: DEFAULT_FALLBACK_VELOCITY,
        }
    }
}

impl<'a> CalculationContext<'a> {
    pub fn new(
        air: &'a AirProperties,
        coefficients: &'a LossCoefficients,
        fallback_velocity: f64,
    ) -> Self {
        Self {
            upstream_airflow: None,
            air,
            coefficients,
            fallback_velocity,
        }
    }

    pub fn with_upstream(mut self, upstream_airflow: Option<f64>) -> Self {
        self.upstream_airflow = upstream_airflow;
        self
    }

    fn base_flow(&self) -> FlowProperties {
        FlowProperties::uncalculated(self.air)
    }
}

/// Computes the flow state of an element from its upstream airflow.
///
/// Calculators are pure: they return a complete `FlowProperties` with
/// `is_calculated = false`; stamping and state transitions belong to the
/// topology that owns the node.
pub trait FlowCalculator {
    fn calculate(&self, ctx: &CalculationContext<'_>) -> ComponentResult<FlowProperties>;
}

impl FlowCalculator for DuctSegment {
    fn calculate(&self, ctx: &CalculationContext<'_>) -> ComponentResult<FlowProperties> {
        let area = check_area(self.profile.area_sq_ft(), "segment cross-sectional area")?;
        let airflow = ctx
            .upstream_airflow
            .or(self.design_airflow)
            .unwrap_or(area * ctx.fallback_velocity);
        let airflow = check_finite(airflow, "segment airflow")?;

        let velocity = airflow / area;
        let dh_ft = in_to_ft(self.profile.hydraulic_diameter());

        let (reynolds, rate) = if airflow.abs() < EPSILON_AIRFLOW {
            (0.0, 0.0)
        } else {
            let re = reynolds_number(velocity, dh_ft, ctx.air.kinematic_viscosity);
            let f = darcy_friction_factor(re, self.material.roughness_ft() / dh_ft);
            (re, friction_rate(f, dh_ft, velocity, ctx.air.density_ratio()))
        };

        let pressure_drop = rate / 100.0 * self.length_ft();

        Ok(FlowProperties {
            airflow,
            velocity: check_finite(velocity, "segment velocity")?,
            pressure_drop: check_finite(pressure_drop, "segment pressure drop")?,
            friction_rate: check_finite(rate, "segment friction rate")?,
            reynolds_number: check_finite(reynolds, "segment Reynolds number")?,
            ..ctx.base_flow()
        })
    }
}

impl FlowCalculator for Equipment {
    fn calculate(&self, ctx: &CalculationContext<'_>) -> ComponentResult<FlowProperties> {
        let (airflow, pressure_drop) = if self.is_source {
            (self.capacity.airflow, self.capacity.static_pressure)
        } else {
            let airflow = ctx.upstream_airflow.unwrap_or(self.capacity.airflow);
            let k = self
                .loss_coefficient
                .unwrap_or_else(|| ctx.coefficients.equipment(self.kind));
            (airflow, k * (airflow / 1000.0).powi(2))
        };
        let airflow = check_finite(airflow, "equipment airflow")?;

        // Face velocity through the first declared port, if any.
        let velocity = match self.points.first() {
            Some(point) => airflow / check_area(point.profile.area_sq_ft(), "equipment face area")?,
            None => 0.0,
        };

        Ok(FlowProperties {
            airflow,
            velocity: check_finite(velocity, "equipment velocity")?,
            pressure_drop: check_finite(pressure_drop, "equipment pressure drop")?,
            ..ctx.base_flow()
        })
    }
}

impl FlowCalculator for Fitting {
    fn calculate(&self, ctx: &CalculationContext<'_>) -> ComponentResult<FlowProperties> {
        let area = check_area(self.inlet.profile.area_sq_ft(), "fitting inlet area")?;
        let airflow = ctx
            .upstream_airflow
            .unwrap_or(area * ctx.fallback_velocity);
        let airflow = check_finite(airflow, "fitting airflow")?;

        let velocity = airflow / area;
        let k = self
            .loss_coefficient
            .unwrap_or_else(|| ctx.coefficients.fitting(self.fitting_type));
        let pressure_drop = k * velocity_pressure(velocity) * ctx.air.density_ratio();
        let dh_ft = in_to_ft(self.inlet.profile.hydraulic_diameter());
        let reynolds = reynolds_number(velocity, dh_ft, ctx.air.kinematic_viscosity);

        Ok(FlowProperties {
            airflow,
            velocity: check_finite(velocity, "fitting velocity")?,
            pressure_drop: check_finite(pressure_drop, "fitting pressure drop")?,
            reynolds_number: check_finite(reynolds, "fitting Reynolds number")?,
            ..ctx.base_flow()
        })
    }
}

impl FlowCalculator for NetworkElement {
    fn calculate(&self, ctx: &CalculationContext<'_>) -> ComponentResult<FlowProperties> {
        match self {
            NetworkElement::Segment(s) => s.calculate(ctx),
            NetworkElement::Equipment(e) => e.calculate(ctx),
            NetworkElement::Fitting(f) => f.calculate(ctx),
        }
    }
}
