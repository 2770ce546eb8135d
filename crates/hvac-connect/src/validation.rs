//! Geometric compatibility checks between two connection points.

use serde::{Deserialize, Serialize};

use hvac_components::{ConnectionPoint, DuctProfile, FittingType, PointId};
use hvac_core::geometry::{alignment_score, distance, midpoint};
use hvac_core::{NodeId, Point3};
use hvac_graph::{SlotStatus, TopologyManager};

use crate::config::ConnectionConfig;

/// How well two profiles match in size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeCompatibility {
    Compatible,
    /// Joinable through a reducer or transition.
    Transitionable,
    Incompatible,
}

/// A fitting the caller should insert between the two points.
#[derive(Debug, Clone, PartialEq)]
pub struct FittingSuggestion {
    pub fitting_type: FittingType,
    pub position: Point3,
    pub inlet_profile: DuctProfile,
    pub outlet_profile: DuctProfile,
    pub reason: String,
}

/// Outcome of validating a prospective connection. Never mutates anything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    /// True when no errors were recorded.
    pub is_valid: bool,
    pub can_connect: bool,
    pub requires_fitting: bool,
    pub suggested_fitting: Option<FittingSuggestion>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Gap between the points, in inches.
    pub distance: f64,
    /// `max(0, a · -b)`, 1.0 when the points face each other exactly.
    pub alignment_score: f64,
}

impl ValidationResult {
    fn failed(error: String) -> Self {
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }
}

/// Compare two profiles. Mixed shapes are never directly compatible.
pub fn size_compatibility(
    a: &DuctProfile,
    b: &DuctProfile,
    config: &ConnectionConfig,
) -> SizeCompatibility {
    let (delta, tolerance, limit) = match (a, b) {
        (DuctProfile::Round { diameter: da }, DuctProfile::Round { diameter: db }) => (
            (da - db).abs(),
            config.round_diameter_tolerance,
            config.round_transition_limit,
        ),
        (DuctProfile::Rectangular { .. }, DuctProfile::Rectangular { .. }) => (
            (a.area() - b.area()).abs(),
            config.rect_area_tolerance,
            config.rect_transition_limit,
        ),
        _ => return SizeCompatibility::Transitionable,
    };
    if delta <= tolerance {
        SizeCompatibility::Compatible
    } else if delta <= limit {
        SizeCompatibility::Transitionable
    } else {
        SizeCompatibility::Incompatible
    }
}

/// Validate a join between two resolved points.
///
/// Mismatches are checked in order: shape, size, alignment. With
/// `auto_fitting` the first mismatch becomes a fitting suggestion, otherwise
/// each one is an error. The join is accepted as a direct join, through the
/// suggested fitting, or as an extension across a short gap.
pub fn validate_points(
    a: &ConnectionPoint,
    b: &ConnectionPoint,
    config: &ConnectionConfig,
) -> ValidationResult {
    let gap = distance(&a.position, &b.position);
    let alignment = alignment_score(&a.direction, &b.direction);
    let mut result = ValidationResult {
        distance: gap,
        alignment_score: alignment,
        ..ValidationResult::default()
    };

    if gap > config.max_distance {
        result.errors.push(format!(
            "Distance {gap:.2} exceeds maximum connection distance {:.2}",
            config.max_distance
        ));
        return result;
    }

    let extension_ok = gap <= config.extension_distance && alignment >= config.extension_alignment;
    let suggest = |result: &mut ValidationResult, fitting_type: FittingType, reason: String| {
        if result.suggested_fitting.is_some() {
            return;
        }
        if config.auto_fitting {
            result.suggested_fitting = Some(FittingSuggestion {
                fitting_type,
                position: midpoint(&a.position, &b.position),
                inlet_profile: a.profile,
                outlet_profile: b.profile,
                reason,
            });
        } else {
            result.errors.push(reason);
        }
    };

    if a.shape() != b.shape() {
        suggest(
            &mut result,
            FittingType::Transition,
            format!("Shape mismatch: {} to {} requires a transition", a.shape(), b.shape()),
        );
    } else {
        match size_compatibility(&a.profile, &b.profile, config) {
            SizeCompatibility::Compatible => {}
            SizeCompatibility::Transitionable => suggest(
                &mut result,
                FittingType::Reducer,
                format!("Size mismatch: {} to {} requires a reducer", a.profile, b.profile),
            ),
            SizeCompatibility::Incompatible => result.errors.push(format!(
                "Size difference between {} and {} exceeds the transition limit",
                a.profile, b.profile
            )),
        }
    }

    if alignment < config.elbow_alignment && !(extension_ok && !config.auto_fitting) {
        suggest(
            &mut result,
            FittingType::Elbow,
            format!("Poor alignment ({alignment:.2}) requires an elbow"),
        );
    }

    result.requires_fitting = result.suggested_fitting.is_some();
    if result.errors.is_empty() {
        let direct = gap <= config.direct_distance
            && alignment >= config.direct_alignment
            && !result.requires_fitting;
        if direct || result.requires_fitting {
            result.can_connect = true;
        } else if extension_ok {
            result.can_connect = true;
            result.warnings.push(format!(
                "Gap of {gap:.2} requires an extension or flex connector"
            ));
        } else {
            result.errors.push(format!(
                "Points are {gap:.2} apart with alignment {alignment:.2}; too far or misaligned to join"
            ));
        }
    }
    result.is_valid = result.errors.is_empty();
    result
}

/// Look up an available point, or describe why it cannot be used.
fn resolve<'a>(
    topology: &'a TopologyManager,
    node: NodeId,
    point: &PointId,
) -> Result<&'a ConnectionPoint, String> {
    let n = topology
        .node(node)
        .ok_or_else(|| format!("Node {node} not found"))?;
    let p = n
        .point(point)
        .ok_or_else(|| format!("Node {node} has no connection point '{point}'"))?;
    match n.slot(point) {
        Some(SlotStatus::Available) => Ok(p),
        _ => Err(format!(
            "Connection point '{point}' on node {node} is already connected"
        )),
    }
}

/// Validate a join between points on two nodes of `topology`.
pub fn validate_connection(
    topology: &TopologyManager,
    from: NodeId,
    to: NodeId,
    from_point: &PointId,
    to_point: &PointId,
    config: &ConnectionConfig,
) -> ValidationResult {
    let a = match resolve(topology, from, from_point) {
        Ok(p) => p,
        Err(e) => return ValidationResult::failed(e),
    };
    let b = match resolve(topology, to, to_point) {
        Ok(p) => p,
        Err(e) => return ValidationResult::failed(e),
    };
    if from == to && from_point == to_point {
        return ValidationResult::failed(format!(
            "Connection point '{from_point}' cannot connect to itself"
        ));
    }
    validate_points(a, b, config)
}
