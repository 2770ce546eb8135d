//! The connection point manager.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use hvac_components::{ComponentError, ConnectionPoint, ElementFactory, PointId, PortRole};
use hvac_core::geometry::{alignment_score, distance};
use hvac_core::{ConnectionId, NodeId};
use hvac_graph::TopologyManager;

use crate::config::ConnectionConfig;
use crate::error::{ConnectError, ConnectResult};
use crate::events::{ConnectionEvent, ConnectionListener};
use crate::history::{ConnectionAttempt, ConnectionHistory, ConnectionStatistics};
use crate::validation::{FittingSuggestion, ValidationResult, validate_connection};

/// A candidate found by [`ConnectionPointManager::find_nearby_connection_points`].
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPoint {
    pub node: NodeId,
    pub point: PointId,
    pub distance: f64,
    pub alignment_score: f64,
    /// `0.5 * (1 - distance / max) + 0.5 * alignment`, higher is better.
    pub score: f64,
    pub validation: ValidationResult,
}

/// Validates prospective joins and materializes accepted ones in a topology.
pub struct ConnectionPointManager {
    config: ConnectionConfig,
    factory: ElementFactory,
    history: ConnectionHistory,
    listener: Option<ConnectionListener>,
}

impl Default for ConnectionPointManager {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl std::fmt::Debug for ConnectionPointManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPointManager")
            .field("config", &self.config)
            .field("attempts", &self.history.attempts().len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ConnectionPointManager {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            factory: ElementFactory::default(),
            history: ConnectionHistory::default(),
            listener: None,
        }
    }

    /// Manager that reports every attempt to `listener`.
    pub fn with_listener(config: ConnectionConfig, listener: ConnectionListener) -> Self {
        Self {
            listener: Some(listener),
            ..Self::new(config)
        }
    }

    /// Use `factory` to build inserted fittings.
    pub fn with_factory(mut self, factory: ElementFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn validate_connection(
        &self,
        topology: &TopologyManager,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> ValidationResult {
        validate_connection(topology, from, to, from_point, to_point, &self.config)
    }

    /// Validate and, if accepted, wire the connection.
    ///
    /// A suggested fitting is inserted first and joined to both sides with
    /// direct connections. Without a suggestion the points are joined as
    /// they are, and an extension gap gets no fitting node, matching what
    /// validation reported. Every attempt is recorded and reported to the
    /// listener. If the topology refuses a wiring step, anything already
    /// inserted for this attempt is removed again.
    pub fn attempt_connection(
        &mut self,
        topology: &mut TopologyManager,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> ValidationResult {
        let validation = self.validate_connection(topology, from, to, from_point, to_point);
        let mut attempt = ConnectionAttempt {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            from_node: from,
            from_point: from_point.clone(),
            to_node: to,
            to_point: to_point.clone(),
            success: false,
            connections: Vec::new(),
            fitting: None,
            validation: validation.clone(),
            errors: validation.errors.clone(),
        };

        let outcome = if validation.can_connect {
            self.wire(topology, &mut attempt, validation.suggested_fitting.as_ref())
        } else {
            Err(ConnectError::Rejected(validation.errors.join("; ")))
        };

        let event = match outcome {
            Ok(()) => {
                attempt.success = true;
                debug!(
                    from = %from, to = %to,
                    connections = attempt.connections.len(),
                    fitting = attempt.fitting.is_some(),
                    "connection attempt succeeded"
                );
                ConnectionEvent::ConnectionCreated(attempt.clone())
            }
            Err(err) => {
                if !matches!(err, ConnectError::Rejected(_)) {
                    attempt.errors.push(err.to_string());
                }
                warn!(from = %from, to = %to, %err, "connection attempt failed");
                ConnectionEvent::ConnectionFailed(attempt.clone())
            }
        };

        let mut result = validation;
        if !attempt.success {
            result.can_connect = false;
            result.is_valid = false;
            result.errors = attempt.errors.clone();
        }
        self.history.record(attempt);
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
        result
    }

    fn wire(
        &self,
        topology: &mut TopologyManager,
        attempt: &mut ConnectionAttempt,
        suggestion: Option<&FittingSuggestion>,
    ) -> ConnectResult<()> {
        let (from, to) = (attempt.from_node, attempt.to_node);
        let Some(suggestion) = suggestion else {
            let c = topology.create_extension_connection(
                from,
                to,
                &attempt.from_point,
                &attempt.to_point,
            )?;
            attempt.connections.push(c.id);
            return Ok(());
        };

        let a = topology.point(from, &attempt.from_point)?.clone();
        let b = topology.point(to, &attempt.to_point)?.clone();
        // The fitting's inlet goes on the upstream side.
        let reversed = feeds_backwards(topology, from, &a, to, &b);
        let (up, up_point, down, down_point, up_cp, down_cp) = if reversed {
            (to, &attempt.to_point, from, &attempt.from_point, &b, &a)
        } else {
            (from, &attempt.from_point, to, &attempt.to_point, &a, &b)
        };

        let fitting = self
            .factory
            .splice_fitting(suggestion.fitting_type, up_cp, down_cp)?;
        let inlet = fitting.inlet.id.clone();
        let outlet = fitting
            .outlets
            .first()
            .map(|p| p.id.clone())
            .ok_or(ComponentError::InvalidArg {
                what: "suggested fitting has no outlet",
            })?;
        let node = topology.add_node(fitting);

        let first = match topology.create_connection(up, node, up_point, &inlet) {
            Ok(c) => c,
            Err(err) => {
                topology.remove_node(node);
                return Err(err.into());
            }
        };
        // Removing the fitting node also removes `first`.
        let second = match topology.create_connection(node, down, &outlet, down_point) {
            Ok(c) => c,
            Err(err) => {
                topology.remove_node(node);
                return Err(err.into());
            }
        };
        attempt.fitting = Some(node);
        attempt.connections.extend([first.id, second.id]);
        Ok(())
    }

    /// Available points on other nodes within `max_distance` of the given
    /// point, best first. Defaults to the configured maximum distance.
    pub fn find_nearby_connection_points(
        &self,
        topology: &TopologyManager,
        node: NodeId,
        point: &PointId,
        max_distance: Option<f64>,
    ) -> Vec<NearbyPoint> {
        let max = max_distance.unwrap_or(self.config.max_distance);
        let Some(origin) = topology.node(node).and_then(|n| n.point(point)) else {
            return Vec::new();
        };
        if max <= 0.0 {
            return Vec::new();
        }

        let mut found: Vec<NearbyPoint> = topology
            .iter_nodes()
            .filter(|n| n.id() != node)
            .flat_map(|n| {
                n.available_points()
                    .into_iter()
                    .map(move |cp| (n.id(), cp))
            })
            .filter_map(|(other, cp)| {
                let d = distance(&origin.position, &cp.position);
                if d > max {
                    return None;
                }
                let alignment = alignment_score(&origin.direction, &cp.direction);
                Some(NearbyPoint {
                    node: other,
                    point: cp.id.clone(),
                    distance: d,
                    alignment_score: alignment,
                    score: 0.5 * (1.0 - d / max) + 0.5 * alignment,
                    validation: self.validate_connection(topology, node, other, point, &cp.id),
                })
            })
            .collect();

        found.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.node.cmp(&b.node))
                .then(a.point.cmp(&b.point))
        });
        found
    }

    /// Join every available point on `node` to its best validating
    /// candidate. Returns the connections created.
    pub fn auto_connect(
        &mut self,
        topology: &mut TopologyManager,
        node: NodeId,
    ) -> Vec<ConnectionId> {
        let points: Vec<PointId> = match topology.node(node) {
            Some(n) => n.available_points().into_iter().map(|p| p.id.clone()).collect(),
            None => return Vec::new(),
        };

        let mut created = Vec::new();
        for point in points {
            // Earlier iterations may have consumed this point or the candidates.
            if topology
                .slot(node, &point)
                .is_none_or(|s| !s.is_available())
            {
                continue;
            }
            let best = self
                .find_nearby_connection_points(topology, node, &point, None)
                .into_iter()
                .find(|c| c.validation.can_connect);
            let Some(best) = best else {
                debug!(node = %node, point = %point, "no candidate for auto-connect");
                continue;
            };
            let result = self.attempt_connection(topology, node, best.node, &point, &best.point);
            if result.can_connect {
                if let Some(attempt) = self.history.last() {
                    created.extend(attempt.connections.iter().copied());
                }
            }
        }
        created
    }

    pub fn history(&self) -> &[ConnectionAttempt] {
        self.history.attempts()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn statistics(&self) -> ConnectionStatistics {
        self.history.statistics()
    }
}

/// True when air runs from `to` into `from`.
fn feeds_backwards(
    topology: &TopologyManager,
    from: NodeId,
    a: &ConnectionPoint,
    to: NodeId,
    b: &ConnectionPoint,
) -> bool {
    let is_source = |id: NodeId| {
        topology
            .node(id)
            .is_some_and(|n| n.element().is_flow_source())
    };
    if is_source(to) && !is_source(from) {
        return true;
    }
    if is_source(from) {
        return false;
    }
    a.role() == PortRole::Inlet || b.role() == PortRole::Outlet
}
