//! Connections between connection points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hvac_components::{PointId, Shape};
use hvac_core::{ConnectionId, NodeId};

use crate::config::TopologyConfig;

/// How two points are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// The ports meet within the direct tolerance.
    Direct,
    /// The ports are close enough to be bridged by a generated fitting.
    FittingRequired,
    /// The gap is too wide. Kept for diagnostics, never wired.
    Invalid,
}

/// Direction air travels across a connection, relative to `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    Forward,
    Reverse,
    Bidirectional,
}

/// The fitting node generated to bridge a `FittingRequired` connection.
///
/// `inlet` joins the upstream side and `outlet` the downstream side, which
/// is `to -> from` for a `Reverse` connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FittingSplice {
    pub node: NodeId,
    pub inlet: PointId,
    pub outlet: PointId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_node: NodeId,
    pub from_point: PointId,
    pub to_node: NodeId,
    pub to_point: PointId,
    pub kind: ConnectionKind,
    pub flow_direction: FlowDirection,
    /// Gap between the two points, in inches.
    pub distance: f64,
    pub required_fitting: Option<FittingSplice>,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    pub fn is_wired(&self) -> bool {
        self.kind != ConnectionKind::Invalid
    }

    /// True if `node` is either endpoint or the generated fitting.
    pub fn involves(&self, node: NodeId) -> bool {
        self.from_node == node
            || self.to_node == node
            || self.required_fitting.as_ref().is_some_and(|f| f.node == node)
    }

    /// Every `(node, point)` slot this connection occupies once wired.
    pub fn occupied_slots(&self) -> Vec<(NodeId, PointId)> {
        if !self.is_wired() {
            return Vec::new();
        }
        let mut slots = vec![
            (self.from_node, self.from_point.clone()),
            (self.to_node, self.to_point.clone()),
        ];
        if let Some(splice) = &self.required_fitting {
            slots.push((splice.node, splice.inlet.clone()));
            slots.push((splice.node, splice.outlet.clone()));
        }
        slots
    }

    /// Calculation dependencies contributed by this connection, as
    /// `(upstream, downstream)` pairs. Self edges are never produced.
    pub fn dependency_edges(&self) -> Vec<(NodeId, NodeId)> {
        if !self.is_wired() {
            return Vec::new();
        }
        let (upstream, downstream) = match self.flow_direction {
            FlowDirection::Forward => (self.from_node, self.to_node),
            FlowDirection::Reverse => (self.to_node, self.from_node),
            FlowDirection::Bidirectional => return Vec::new(),
        };
        let edges = match &self.required_fitting {
            Some(splice) => vec![(upstream, splice.node), (splice.node, downstream)],
            None => vec![(upstream, downstream)],
        };
        edges.into_iter().filter(|(a, b)| a != b).collect()
    }
}

/// Classify a gap between two points.
pub fn classify(distance: f64, shapes_match: bool, config: &TopologyConfig) -> ConnectionKind {
    if distance <= config.direct_tolerance && shapes_match {
        ConnectionKind::Direct
    } else if distance <= config.max_fitting_distance {
        ConnectionKind::FittingRequired
    } else {
        ConnectionKind::Invalid
    }
}

/// Fitting type used to bridge two shapes.
pub fn splice_type(from: Shape, to: Shape) -> hvac_components::FittingType {
    if from == to {
        hvac_components::FittingType::Elbow
    } else {
        hvac_components::FittingType::Transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvac_components::FittingType;

    fn connection(kind: ConnectionKind, direction: FlowDirection) -> Connection {
        Connection {
            id: ConnectionId::from_index(0),
            from_node: NodeId::from_index(1),
            from_point: "outlet".into(),
            to_node: NodeId::from_index(2),
            to_point: "inlet".into(),
            kind,
            flow_direction: direction,
            distance: 0.0,
            required_fitting: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn classification_thresholds() {
        let cfg = TopologyConfig::default();
        assert_eq!(classify(0.0, true, &cfg), ConnectionKind::Direct);
        assert_eq!(classify(0.5, true, &cfg), ConnectionKind::Direct);
        assert_eq!(classify(0.8, true, &cfg), ConnectionKind::FittingRequired);
        assert_eq!(classify(0.2, false, &cfg), ConnectionKind::FittingRequired);
        assert_eq!(classify(1.5, true, &cfg), ConnectionKind::FittingRequired);
        assert_eq!(classify(6.0, true, &cfg), ConnectionKind::FittingRequired);
        assert_eq!(classify(12.0, true, &cfg), ConnectionKind::FittingRequired);
        assert_eq!(classify(12.01, true, &cfg), ConnectionKind::Invalid);
    }

    #[test]
    fn splice_type_depends_on_shape() {
        assert_eq!(splice_type(Shape::Round, Shape::Round), FittingType::Elbow);
        assert_eq!(
            splice_type(Shape::Round, Shape::Rectangular),
            FittingType::Transition
        );
    }

    #[test]
    fn reverse_direct_edge_points_back() {
        let c = connection(ConnectionKind::Direct, FlowDirection::Reverse);
        assert_eq!(
            c.dependency_edges(),
            vec![(NodeId::from_index(2), NodeId::from_index(1))]
        );
    }

    #[test]
    fn splice_routes_through_fitting() {
        let mut c = connection(ConnectionKind::FittingRequired, FlowDirection::Forward);
        c.required_fitting = Some(FittingSplice {
            node: NodeId::from_index(7),
            inlet: "inlet".into(),
            outlet: "outlet".into(),
        });
        assert_eq!(
            c.dependency_edges(),
            vec![
                (NodeId::from_index(1), NodeId::from_index(7)),
                (NodeId::from_index(7), NodeId::from_index(2)),
            ]
        );
        assert!(c.involves(NodeId::from_index(7)));
        assert_eq!(c.occupied_slots().len(), 4);
    }

    #[test]
    fn invalid_and_bidirectional_add_no_edges() {
        assert!(
            connection(ConnectionKind::Invalid, FlowDirection::Forward)
                .dependency_edges()
                .is_empty()
        );
        assert!(
            connection(ConnectionKind::Invalid, FlowDirection::Forward)
                .occupied_slots()
                .is_empty()
        );
        assert!(
            connection(ConnectionKind::Direct, FlowDirection::Bidirectional)
                .dependency_edges()
                .is_empty()
        );
    }

    #[test]
    fn self_connection_has_no_dependency() {
        let mut c = connection(ConnectionKind::Direct, FlowDirection::Forward);
        c.to_node = c.from_node;
        assert!(c.dependency_edges().is_empty());
    }
}
