//! Duct friction using the Darcy-Weisbach relation.

use hvac_core::units::constants::velocity_pressure;

/// Laminar/turbulent boundary.
const RE_LAMINAR: f64 = 2300.0;

/// Darcy friction factor.
///
/// Laminar: 64/Re. Turbulent: Swamee-Jain explicit approximation of
/// Colebrook-White. `relative_roughness` is e/D (dimensionless).
pub fn darcy_friction_factor(reynolds: f64, relative_roughness: f64) -> f64 {
    if reynolds <= 0.0 {
        return 0.0;
    }
    if reynolds < RE_LAMINAR {
        64.0 / reynolds
    } else {
        let a = relative_roughness / 3.7;
        let b = 5.74 / reynolds.powf(0.9);
        let f = 0.25 / (a + b).log10().powi(2);
        // Swamee-Jain tends to zero for smooth duct far past its fitted Re range.
        f.max(0.0001)
    }
}

/// Reynolds number from velocity (FPM), hydraulic diameter (ft) and
/// kinematic viscosity (ft^2/s).
pub fn reynolds_number(velocity_fpm: f64, hydraulic_diameter_ft: f64, kinematic_viscosity: f64) -> f64 {
    (velocity_fpm.abs() / 60.0) * hydraulic_diameter_ft / kinematic_viscosity
}

/// Friction loss per 100 ft of duct, in. w.g.
///
/// `Δp/100ft = f · (100 / Dh) · VP · (ρ/ρ_std)`.
pub fn friction_rate(
    friction_factor: f64,
    hydraulic_diameter_ft: f64,
    velocity_fpm: f64,
    density_ratio: f64,
) -> f64 {
    if hydraulic_diameter_ft <= 0.0 {
        return 0.0;
    }
    friction_factor * (100.0 / hydraulic_diameter_ft) * velocity_pressure(velocity_fpm) * density_ratio
}
