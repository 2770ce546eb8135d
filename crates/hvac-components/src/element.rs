//! Network element payloads.
//!
//! Every node in the network carries exactly one `NetworkElement`. Kind-specific
//! behavior is reached through exhaustive matches on the variant, never by
//! probing fields.

use core::fmt;

use serde::{Deserialize, Serialize};

use hvac_core::Point3;
use hvac_core::geometry::distance;
use hvac_core::units::in_to_ft;

use crate::point::{ConnectionPoint, PointId};
use crate::profile::{DuctMaterial, DuctProfile};

/// Discriminant of a `NetworkElement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Segment,
    Equipment,
    Fitting,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Segment => write!(f, "segment"),
            ElementKind::Equipment => write!(f, "equipment"),
            ElementKind::Fitting => write!(f, "fitting"),
        }
    }
}

/// A straight duct run between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct DuctSegment {
    pub name: String,
    pub start: Point3,
    pub end: Point3,
    pub profile: DuctProfile,
    pub material: DuctMaterial,
    /// Design airflow (CFM) used when the segment has no upstream source.
    pub design_airflow: Option<f64>,
    pub inlet: ConnectionPoint,
    pub outlet: ConnectionPoint,
}

impl DuctSegment {
    /// Centerline length in inches.
    pub fn length(&self) -> f64 {
        distance(&self.start, &self.end)
    }

    /// Centerline length in feet.
    pub fn length_ft(&self) -> f64 {
        in_to_ft(self.length())
    }
}

/// Equipment categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    Fan,
    AirHandler,
    VavBox,
    Damper,
    Filter,
    Coil,
    Diffuser,
    Grille,
}

impl EquipmentKind {
    /// Fans and air handlers push air into the network.
    pub fn is_source_by_default(&self) -> bool {
        matches!(self, EquipmentKind::Fan | EquipmentKind::AirHandler)
    }

    /// Diffusers and grilles only receive air.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EquipmentKind::Diffuser | EquipmentKind::Grille)
    }
}

/// Rated operating point of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EquipmentCapacity {
    /// CFM
    pub airflow: f64,
    /// in. w.g.
    pub static_pressure: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub name: String,
    pub kind: EquipmentKind,
    pub position: Point3,
    pub capacity: EquipmentCapacity,
    /// Sources establish airflow instead of passing upstream flow through.
    pub is_source: bool,
    /// Overrides the catalog pass-through loss coefficient.
    pub loss_coefficient: Option<f64>,
    pub points: Vec<ConnectionPoint>,
}

/// Fitting categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FittingType {
    Elbow,
    Tee,
    Wye,
    Reducer,
    Transition,
    Cap,
}

impl fmt::Display for FittingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FittingType::Elbow => "elbow",
            FittingType::Tee => "tee",
            FittingType::Wye => "wye",
            FittingType::Reducer => "reducer",
            FittingType::Transition => "transition",
            FittingType::Cap => "cap",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fitting {
    pub name: String,
    pub fitting_type: FittingType,
    pub position: Point3,
    pub inlet: ConnectionPoint,
    pub outlets: Vec<ConnectionPoint>,
    /// Overrides the catalog K-factor.
    pub loss_coefficient: Option<f64>,
}

/// The kind-specific payload of a network node.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkElement {
    Segment(DuctSegment),
    Equipment(Equipment),
    Fitting(Fitting),
}

impl NetworkElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            NetworkElement::Segment(_) => ElementKind::Segment,
            NetworkElement::Equipment(_) => ElementKind::Equipment,
            NetworkElement::Fitting(_) => ElementKind::Fitting,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NetworkElement::Segment(s) => &s.name,
            NetworkElement::Equipment(e) => &e.name,
            NetworkElement::Fitting(f) => &f.name,
        }
    }

    /// All declared connection points, in declaration order.
    pub fn connection_points(&self) -> Vec<&ConnectionPoint> {
        match self {
            NetworkElement::Segment(s) => vec![&s.inlet, &s.outlet],
            NetworkElement::Equipment(e) => e.points.iter().collect(),
            NetworkElement::Fitting(f) => std::iter::once(&f.inlet).chain(&f.outlets).collect(),
        }
    }

    pub fn point(&self, id: &PointId) -> Option<&ConnectionPoint> {
        self.connection_points().into_iter().find(|p| &p.id == id)
    }

    /// True for equipment that establishes airflow on its own.
    pub fn is_flow_source(&self) -> bool {
        matches!(self, NetworkElement::Equipment(e) if e.is_source)
    }

    /// Design airflow declared on the element, if any.
    pub fn design_airflow(&self) -> Option<f64> {
        match self {
            NetworkElement::Segment(s) => s.design_airflow,
            NetworkElement::Equipment(e) => Some(e.capacity.airflow),
            NetworkElement::Fitting(_) => None,
        }
    }
}

impl From<DuctSegment> for NetworkElement {
    fn from(s: DuctSegment) -> Self {
        NetworkElement::Segment(s)
    }
}

impl From<Equipment> for NetworkElement {
    fn from(e: Equipment) -> Self {
        NetworkElement::Equipment(e)
    }
}

impl From<Fitting> for NetworkElement {
    fn from(f: Fitting) -> Self {
        NetworkElement::Fitting(f)
    }
}
