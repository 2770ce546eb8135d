// hvac-core/src/units.rs
//
// Unit convention: geometry is expressed in inches (positions, diameters,
// widths), airflow in CFM, velocity in FPM and pressure in inches of water
// gauge. The engine does not carry units through its data model; uom is used
// at the conversion points so the factors live in one place.

use uom::si::f64::{
    Area as UomArea, Length as UomLength, ThermodynamicTemperature as UomThermodynamicTemperature,
};

pub type Area = UomArea;
pub type Length = UomLength;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn inches(v: f64) -> Length {
    use uom::si::length::inch;
    Length::new::<inch>(v)
}

#[inline]
pub fn feet(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn square_inches(v: f64) -> Area {
    use uom::si::area::square_inch;
    Area::new::<square_inch>(v)
}

#[inline]
pub fn fahrenheit(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    Temperature::new::<degree_fahrenheit>(v)
}

/// Inches to feet.
#[inline]
pub fn in_to_ft(v: f64) -> f64 {
    use uom::si::length::foot;
    inches(v).get::<foot>()
}

/// Square inches to square feet.
///
/// Plain division keeps whole-number areas exact (144 in^2 is exactly 1 ft^2).
#[inline]
pub fn sq_in_to_sq_ft(v: f64) -> f64 {
    v / 144.0
}

/// Degrees Fahrenheit to kelvin.
#[inline]
pub fn fahrenheit_to_kelvin(v: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    fahrenheit(v).get::<kelvin>()
}

pub mod constants {
    /// Velocity-pressure constant for standard air: VP = (V / 4005)^2 in. w.g.
    pub const VELOCITY_PRESSURE_FPM: f64 = 4005.0;

    /// Standard air density, lb/ft^3.
    pub const STANDARD_AIR_DENSITY: f64 = 0.075;

    /// Standard air temperature, degrees F.
    pub const STANDARD_AIR_TEMP_F: f64 = 70.0;

    /// Kinematic viscosity of standard air, ft^2/s.
    pub const STANDARD_AIR_KINEMATIC_VISCOSITY: f64 = 1.62e-4;

    /// Velocity pressure in inches of water for a velocity in FPM.
    #[inline]
    pub fn velocity_pressure(velocity_fpm: f64) -> f64 {
        (velocity_fpm / VELOCITY_PRESSURE_FPM).powi(2)
    }
}
