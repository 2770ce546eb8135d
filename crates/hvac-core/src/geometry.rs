//! 3D geometry helpers for connection points.

use crate::error::{HvacError, HvacResult};
use crate::numeric::{GEOMETRY_TOLERANCE, approx_eq};

pub type Point3 = nalgebra::Point3<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

const NORMALIZE_EPS: f64 = 1e-12;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    nalgebra::distance(a, b)
}

/// Point halfway between `a` and `b`.
#[inline]
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    nalgebra::center(a, b)
}

/// True if two points are the same within [`GEOMETRY_TOLERANCE`].
pub fn coincident(a: &Point3, b: &Point3) -> bool {
    distance(a, b) <= GEOMETRY_TOLERANCE
}

/// Component-wise comparison of two directions within [`GEOMETRY_TOLERANCE`].
pub fn same_direction(a: &Vector3, b: &Vector3) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| approx_eq(*x, *y, GEOMETRY_TOLERANCE))
}

/// Normalize a direction, rejecting zero-length vectors.
pub fn unit(v: &Vector3) -> HvacResult<Vector3> {
    v.try_normalize(NORMALIZE_EPS)
        .ok_or(HvacError::InvalidArg {
            what: "direction vector has zero length",
        })
}

/// How directly two outward-facing connection points face each other.
///
/// `max(0, a · -b)` on normalized directions: 1.0 when exactly opposed,
/// 0.0 when perpendicular or pointing the same way. Zero vectors score 0.
pub fn alignment_score(a: &Vector3, b: &Vector3) -> f64 {
    let (Some(a), Some(b)) = (
        a.try_normalize(NORMALIZE_EPS),
        b.try_normalize(NORMALIZE_EPS),
    ) else {
        return 0.0;
    };
    a.dot(&(-b)).clamp(0.0, 1.0)
}
