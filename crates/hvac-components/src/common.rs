//! Common utilities for flow calculations.

use crate::error::{ComponentError, ComponentResult};
use hvac_core::numeric::{ensure_finite, ensure_positive};

/// Airflow below this is treated as no flow (CFM).
pub const EPSILON_AIRFLOW: f64 = 1e-9;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Ensure a cross-sectional area can be divided by.
pub fn check_area(area: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_positive(area, what).map_err(|_| ComponentError::NonPhysical { what })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_area() {
        assert!(check_area(0.0, "area").is_err());
        assert!(check_area(-1.0, "area").is_err());
        assert_eq!(check_area(2.0, "area").unwrap(), 2.0);
    }
}
