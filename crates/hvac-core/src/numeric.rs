//! Float helpers shared by geometry and flow calculations.

use crate::HvacError;

/// Floating point type used throughout the engine.
pub type Real = f64;

/// Positions and direction components closer than this are the same (inches).
pub const GEOMETRY_TOLERANCE: Real = 1e-6;

/// Absolute comparison within `tol`.
#[inline]
pub fn approx_eq(a: Real, b: Real, tol: Real) -> bool {
    (a - b).abs() <= tol
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HvacError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HvacError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero (areas, diameters, lengths).
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, HvacError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(HvacError::NonPositive { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_uses_absolute_tolerance() {
        assert!(approx_eq(120.0, 120.0 + 1e-7, GEOMETRY_TOLERANCE));
        assert!(!approx_eq(120.0, 120.001, GEOMETRY_TOLERANCE));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "airflow").unwrap_err();
        assert!(err.to_string().contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(ensure_positive(0.0, "area").is_err());
        assert!(ensure_positive(-2.0, "area").is_err());
        assert_eq!(ensure_positive(3.5, "area").unwrap(), 3.5);
    }
}
