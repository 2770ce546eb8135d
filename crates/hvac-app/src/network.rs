//! The network facade: one topology, its connection manager and its
//! calculation engine, kept in step.

use tracing::debug;

use hvac_components::{ElementFactory, NetworkElement, PointId};
use hvac_connect::{
    ConnectionListener, ConnectionPointManager, ConnectionStatistics, NearbyPoint,
    ValidationResult,
};
use hvac_core::{Clock, ConnectionId, NodeId, SystemClock};
use hvac_engine::{CalculationEngine, CalculationListener, SystemCalculationResults};
use hvac_graph::{SystemPath, TopologyManager, TopologyValidationResult};

use crate::config::HvacConfig;
use crate::error::{AppError, AppResult};

/// Owns the three managers and routes every topology change to the engine.
///
/// Mutations go through this type so the engine always sees the events the
/// topology emits. Calculations still only run when [`HvacNetwork::poll`] or
/// [`HvacNetwork::recalculate`] is called.
#[derive(Debug)]
pub struct HvacNetwork<C: Clock = SystemClock> {
    config: HvacConfig,
    factory: ElementFactory,
    topology: TopologyManager,
    connections: ConnectionPointManager,
    engine: CalculationEngine<C>,
}

impl HvacNetwork<SystemClock> {
    pub fn new(config: HvacConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for HvacNetwork<SystemClock> {
    fn default() -> Self {
        Self::new(HvacConfig::default())
    }
}

impl<C: Clock> HvacNetwork<C> {
    pub fn with_clock(config: HvacConfig, clock: C) -> Self {
        let factory = ElementFactory::default();
        let topology = TopologyManager::with_config(config.topology)
            .with_factory(factory)
            .with_air(config.calculation.air);
        let connections = ConnectionPointManager::new(config.connection).with_factory(factory);
        let engine = CalculationEngine::with_clock(config.calculation.clone(), clock);
        Self {
            config,
            factory,
            topology,
            connections,
            engine,
        }
    }

    /// Receive every connection attempt outcome.
    pub fn with_connection_listener(mut self, listener: ConnectionListener) -> Self {
        self.connections = ConnectionPointManager::with_listener(self.config.connection, listener)
            .with_factory(self.factory);
        self
    }

    /// Receive every calculation event.
    pub fn with_calculation_listener(mut self, listener: CalculationListener) -> Self {
        self.engine = self.engine.with_listener(listener);
        self
    }

    pub fn config(&self) -> &HvacConfig {
        &self.config
    }

    pub fn factory(&self) -> ElementFactory {
        self.factory
    }

    pub fn topology(&self) -> &TopologyManager {
        &self.topology
    }

    pub fn engine(&self) -> &CalculationEngine<C> {
        &self.engine
    }

    // ---------------------------------------------------------------------
    // Elements
    // ---------------------------------------------------------------------

    pub fn add_element(&mut self, element: impl Into<NetworkElement>) -> NodeId {
        let id = self.topology.add_node(element);
        self.forward_events();
        id
    }

    /// Replace a node's element. Connections whose points moved or vanished
    /// are dropped and returned.
    pub fn update_element(
        &mut self,
        id: NodeId,
        element: impl Into<NetworkElement>,
    ) -> AppResult<Vec<ConnectionId>> {
        let dropped = self.topology.update_node(id, element)?;
        self.forward_events();
        Ok(dropped)
    }

    pub fn remove_element(&mut self, id: NodeId) -> bool {
        let removed = self.topology.remove_node(id);
        self.forward_events();
        removed
    }

    // ---------------------------------------------------------------------
    // Connections
    // ---------------------------------------------------------------------

    /// Check a prospective connection without changing anything.
    pub fn validate_connection(
        &self,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> ValidationResult {
        self.connections
            .validate_connection(&self.topology, from, to, from_point, to_point)
    }

    /// Validate and wire a connection, inserting a fitting if one is needed.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> ValidationResult {
        let result =
            self.connections
                .attempt_connection(&mut self.topology, from, to, from_point, to_point);
        self.forward_events();
        result
    }

    /// Like [`HvacNetwork::connect`] but turns a refusal into an error.
    pub fn try_connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> AppResult<ValidationResult> {
        let result = self.connect(from, to, from_point, to_point);
        if result.can_connect {
            Ok(result)
        } else {
            Err(AppError::ConnectionRejected(format!(
                "{from}:{from_point} -> {to}:{to_point}: {}",
                result.errors.join("; ")
            )))
        }
    }

    pub fn disconnect(&mut self, id: ConnectionId) -> bool {
        let removed = self.topology.remove_connection(id);
        self.forward_events();
        removed
    }

    pub fn find_nearby(
        &self,
        node: NodeId,
        point: &PointId,
        max_distance: Option<f64>,
    ) -> AppResult<Vec<NearbyPoint>> {
        if !self.topology.contains_node(node) {
            return Err(AppError::NodeNotFound(node));
        }
        Ok(self
            .connections
            .find_nearby_connection_points(&self.topology, node, point, max_distance))
    }

    pub fn auto_connect(&mut self, node: NodeId) -> Vec<ConnectionId> {
        let created = self.connections.auto_connect(&mut self.topology, node);
        self.forward_events();
        created
    }

    pub fn connection_statistics(&self) -> ConnectionStatistics {
        self.connections.statistics()
    }

    pub fn connection_manager(&self) -> &ConnectionPointManager {
        &self.connections
    }

    // ---------------------------------------------------------------------
    // Calculation
    // ---------------------------------------------------------------------

    /// Run the pending pass if its debounce window has closed.
    pub fn poll(&mut self) -> Option<SystemCalculationResults> {
        self.engine.poll(&mut self.topology)
    }

    /// Mark everything dirty and calculate immediately.
    pub fn recalculate(&mut self) -> Option<SystemCalculationResults> {
        self.engine.trigger_system_calculation(&mut self.topology);
        self.engine.calculate_now(&mut self.topology)
    }

    pub fn is_pending(&self) -> bool {
        self.engine.is_pending()
    }

    pub fn validate(&self) -> TopologyValidationResult {
        self.topology
            .validate_topology(&self.config.calculation.limits)
    }

    pub fn critical_path(&self) -> Option<SystemPath> {
        self.topology.critical_path()
    }

    fn forward_events(&mut self) {
        let events = self.topology.drain_events();
        if !events.is_empty() {
            debug!(count = events.len(), "forwarding topology events");
        }
        for event in &events {
            self.engine.handle_event(&mut self.topology, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hvac_components::DuctProfile;
    use hvac_core::{ManualClock, Point3, Vector3};
    use std::time::Duration;

    fn network() -> (HvacNetwork<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (HvacNetwork::with_clock(HvacConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn mutations_schedule_a_pass() {
        let (mut net, clock) = network();
        let fan = net
            .factory()
            .fan("fan", Point3::origin(), Vector3::x(), DuctProfile::round(12.0), 900.0, 1.0)
            .unwrap();
        net.add_element(fan);
        assert!(net.is_pending());
        assert!(net.poll().is_none());
        clock.advance(Duration::from_millis(500));
        let results = net.poll().unwrap();
        assert_eq!(results.calculated_elements, 1);
        assert!(!net.is_pending());
    }

    #[test]
    fn rejected_connection_is_an_error() {
        let (mut net, _) = network();
        let f = net.factory();
        let a = net.add_element(
            f.round_segment("a", Point3::origin(), Point3::new(60.0, 0.0, 0.0), 10.0)
                .unwrap(),
        );
        let b = net.add_element(
            f.round_segment(
                "b",
                Point3::new(90.0, 0.0, 0.0),
                Point3::new(150.0, 0.0, 0.0),
                10.0,
            )
            .unwrap(),
        );
        let err = net
            .try_connect(a, b, &"outlet".into(), &"inlet".into())
            .unwrap_err();
        assert!(matches!(err, AppError::ConnectionRejected(_)));
        assert_eq!(net.topology().connection_count(), 0);
        assert_eq!(net.connection_statistics().failed, 1);
    }

    #[test]
    fn nearby_on_unknown_node_fails() {
        let (net, _) = network();
        assert!(matches!(
            net.find_nearby(NodeId::from_index(3), &"outlet".into(), None),
            Err(AppError::NodeNotFound(_))
        ));
    }
}
