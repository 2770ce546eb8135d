//! Connection points: the joinable ports of an element.

use core::fmt;

use hvac_core::geometry::{coincident, same_direction};
use hvac_core::{Point3, Vector3};

use crate::profile::{DuctProfile, Shape};

/// Identifier of a connection point, unique within its element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which way air crosses a port, as declared by whoever built it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PortRole {
    Inlet,
    /// Outlets and branches: the port discharges air.
    Outlet,
    #[default]
    Unknown,
}

/// A port where an element can be joined to another.
///
/// `direction` is a unit vector pointing out of the element. Two points face
/// each other perfectly when their directions are anti-parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoint {
    pub id: PointId,
    pub position: Point3,
    pub direction: Vector3,
    pub profile: DuctProfile,
    pub role: PortRole,
}

impl ConnectionPoint {
    /// A port with no declared role.
    pub fn new(
        id: impl Into<PointId>,
        position: Point3,
        direction: Vector3,
        profile: DuctProfile,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            direction,
            profile,
            role: PortRole::Unknown,
        }
    }

    pub fn inlet(
        id: impl Into<PointId>,
        position: Point3,
        direction: Vector3,
        profile: DuctProfile,
    ) -> Self {
        Self::new(id, position, direction, profile).with_role(PortRole::Inlet)
    }

    pub fn outlet(
        id: impl Into<PointId>,
        position: Point3,
        direction: Vector3,
        profile: DuctProfile,
    ) -> Self {
        Self::new(id, position, direction, profile).with_role(PortRole::Outlet)
    }

    pub fn with_role(mut self, role: PortRole) -> Self {
        self.role = role;
        self
    }

    pub fn shape(&self) -> Shape {
        self.profile.shape()
    }

    pub fn role(&self) -> PortRole {
        self.role
    }

    /// True when id, role, position, direction and profile all match.
    ///
    /// Used to decide whether an element update invalidates a connection.
    pub fn same_geometry(&self, other: &ConnectionPoint) -> bool {
        self.id == other.id
            && self.role == other.role
            && coincident(&self.position, &other.position)
            && same_direction(&self.direction, &other.direction)
            && self.profile == other.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_geometry_detects_moves() {
        let a = ConnectionPoint::new(
            "inlet",
            Point3::origin(),
            Vector3::x(),
            DuctProfile::round(12.0),
        );
        let mut b = a.clone();
        assert!(a.same_geometry(&b));
        b.position.x += 1.0;
        assert!(!a.same_geometry(&b));
    }

    #[test]
    fn roles_are_declared_not_inferred() {
        let (o, x, p) = (Point3::origin(), Vector3::x(), DuctProfile::round(6.0));
        assert_eq!(ConnectionPoint::inlet("collar", o, x, p).role(), PortRole::Inlet);
        assert_eq!(ConnectionPoint::outlet("supply-2", o, x, p).role(), PortRole::Outlet);
        assert_eq!(ConnectionPoint::new("inlet", o, x, p).role(), PortRole::Unknown);

        let a = ConnectionPoint::inlet("collar", o, x, p);
        assert!(!a.same_geometry(&a.clone().with_role(PortRole::Outlet)));
    }

    #[test]
    fn point_id_conversions() {
        let id: PointId = "outlet".into();
        assert_eq!(id.as_str(), "outlet");
        assert_eq!(id.to_string(), "outlet");
    }
}
