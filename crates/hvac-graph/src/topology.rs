//! The mutable network topology.
//!
//! `TopologyManager` owns every node and connection, keeps connection slots
//! consistent, derives calculation dependencies from wired connections and
//! maintains a topological calculation order. Mutations are recorded as
//! [`TopologyEvent`]s for the owner to drain.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use hvac_components::{
    AirProperties, ComponentError, ConnectionPoint, ElementFactory, ElementKind, FlowProperties,
    NetworkElement, PointId, PortRole,
};
use hvac_core::geometry::distance;
use hvac_core::{ConnectionId, IdAllocator, NodeId};

use crate::config::TopologyConfig;
use crate::connection::{
    Connection, ConnectionKind, FittingSplice, FlowDirection, classify, splice_type,
};
use crate::error::{GraphError, GraphResult};
use crate::events::TopologyEvent;
use crate::node::{Node, SlotStatus};
use crate::order::topological_order;

#[derive(Debug, Clone, Default)]
pub struct TopologyManager {
    config: TopologyConfig,
    factory: ElementFactory,
    air: AirProperties,
    nodes: BTreeMap<NodeId, Node>,
    connections: BTreeMap<ConnectionId, Connection>,
    node_ids: IdAllocator,
    connection_ids: IdAllocator,
    order: Vec<NodeId>,
    events: Vec<TopologyEvent>,
}

impl TopologyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TopologyConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Use `factory` for generated fittings.
    pub fn with_factory(mut self, factory: ElementFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Air used to seed the flow state of new nodes.
    pub fn with_air(mut self, air: AirProperties) -> Self {
        self.air = air;
        self
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Snapshot of every node, in id order.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    /// Snapshot of every connection, in id order.
    pub fn connections(&self) -> Vec<Connection> {
        self.connections.values().cloned().collect()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn iter_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Connections touching `node`, including ones it bridges as a generated fitting.
    pub fn connections_of(&self, node: NodeId) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|c| c.involves(node))
            .collect()
    }

    /// Resolve a connection point on a node.
    pub fn point(&self, node: NodeId, point: &PointId) -> GraphResult<&ConnectionPoint> {
        self.nodes
            .get(&node)
            .ok_or(GraphError::NodeNotFound(node))?
            .point(point)
            .ok_or_else(|| GraphError::PointNotFound {
                node,
                point: point.clone(),
            })
    }

    pub fn slot(&self, node: NodeId, point: &PointId) -> Option<SlotStatus> {
        self.nodes.get(&node).and_then(|n| n.slot(point))
    }

    /// Current calculation order: every node appears after its dependencies.
    pub fn calculation_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Dirty nodes, in calculation order.
    pub fn dirty_nodes(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.nodes.get(id).is_some_and(Node::is_dirty))
            .collect()
    }

    /// Nodes that read `node`'s results directly.
    pub fn direct_dependents(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.calc.dependencies.contains(&node))
            .map(Node::id)
            .collect()
    }

    /// Every node downstream of `node`, transitively. Excludes `node` itself.
    pub fn dependents(&self, node: NodeId) -> BTreeSet<NodeId> {
        let reverse = self.reverse_dependencies();
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            for &next in reverse.get(&current).into_iter().flatten() {
                if next != node && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Sum of the airflow of `node`'s direct dependencies, or `None` if it has none.
    pub fn upstream_airflow(&self, node: NodeId) -> Option<f64> {
        let deps = &self.nodes.get(&node)?.calc.dependencies;
        if deps.is_empty() {
            return None;
        }
        Some(
            deps.iter()
                .filter_map(|d| self.nodes.get(d))
                .map(|n| n.flow.airflow)
                .sum(),
        )
    }

    // ---------------------------------------------------------------------
    // Node mutation
    // ---------------------------------------------------------------------

    /// Insert an element. The new node starts dirty with every slot available.
    pub fn add_node(&mut self, element: impl Into<NetworkElement>) -> NodeId {
        let id = self.insert_node(element.into());
        let kind = self.nodes[&id].kind();
        self.refresh_order();
        debug!(node = %id, ?kind, "node added");
        self.events.push(TopologyEvent::NodeAdded { node: id, kind });
        id
    }

    /// Remove a node and every connection involving it. Returns false if the
    /// node does not exist.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        let downstream = self.dependents(id);
        let doomed: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.involves(id))
            .map(|c| c.id)
            .collect();
        for cid in doomed {
            self.detach_connection(cid);
        }
        if self.nodes.remove(&id).is_some() {
            self.events.push(TopologyEvent::NodeRemoved { node: id });
        }
        self.rebuild_dependencies();
        self.refresh_order();
        for n in downstream {
            self.mark_dirty(n);
        }
        debug!(node = %id, "node removed");
        true
    }

    /// Replace a node's element.
    ///
    /// Connections whose point on this node disappeared or changed geometry
    /// are removed and returned, including unwired `Invalid` ones whose stored
    /// gap no longer holds. Everything else stays wired. The node and its
    /// dependents are marked dirty.
    pub fn update_node(
        &mut self,
        id: NodeId,
        element: impl Into<NetworkElement>,
    ) -> GraphResult<Vec<ConnectionId>> {
        let element = element.into();
        let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;

        let mut invalidated = Vec::new();
        for (point, status) in node.slots() {
            let SlotStatus::Connected(cid) = status else {
                continue;
            };
            let unchanged = match (node.point(point), element.point(point)) {
                (Some(old), Some(new)) => old.same_geometry(new),
                _ => false,
            };
            if !unchanged {
                invalidated.push(cid);
            }
        }
        for c in self.connections.values().filter(|c| !c.is_wired()) {
            let moved = [(c.from_node, &c.from_point), (c.to_node, &c.to_point)]
                .into_iter()
                .filter(|(n, _)| *n == id)
                .any(|(_, p)| match (node.point(p), element.point(p)) {
                    (Some(old), Some(new)) => !old.same_geometry(new),
                    _ => true,
                });
            if moved {
                invalidated.push(c.id);
            }
        }
        invalidated.sort();
        invalidated.dedup();

        for &cid in &invalidated {
            self.detach_connection(cid);
        }

        let kind = element.kind();
        if let Some(node) = self.nodes.get_mut(&id) {
            let previous: BTreeMap<PointId, SlotStatus> =
                node.slots().map(|(p, s)| (p.clone(), s)).collect();
            node.replace_element(element, |p| previous.get(p).copied());
        }
        self.rebuild_dependencies();
        self.refresh_order();
        self.mark_dirty(id);

        if !invalidated.is_empty() {
            warn!(node = %id, count = invalidated.len(), "update invalidated connections");
        }
        debug!(node = %id, ?kind, "node updated");
        self.events.push(TopologyEvent::NodeUpdated { node: id, kind });
        Ok(invalidated)
    }

    // ---------------------------------------------------------------------
    // Connection mutation
    // ---------------------------------------------------------------------

    /// Join `from_point` on `from` to `to_point` on `to`.
    ///
    /// The gap between the points decides the kind:
    /// - `Direct` within `direct_tolerance` and matching shapes
    /// - `FittingRequired` within `max_fitting_distance`; a bridging fitting
    ///   node is generated and spliced in
    /// - `Invalid` otherwise; the connection is stored for diagnostics but
    ///   occupies no slots and contributes no dependency
    ///
    /// The generated fitting's inlet sits on the upstream side, so a
    /// `Reverse` connection gets a fitting that faces `to -> from`.
    ///
    /// A connection that would close a dependency cycle is rolled back.
    pub fn create_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> GraphResult<Connection> {
        self.join(from, to, from_point, to_point, true)
    }

    /// Join two points across a short gap without generating a fitting.
    ///
    /// The gap is closed on site by an extension or flex connector, so any
    /// gap up to `max_fitting_distance` is wired as `Direct` and keeps its
    /// measured distance. Wider gaps are stored as `Invalid`. Profile
    /// compatibility is the caller's concern.
    pub fn create_extension_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
    ) -> GraphResult<Connection> {
        self.join(from, to, from_point, to_point, false)
    }

    fn join(
        &mut self,
        from: NodeId,
        to: NodeId,
        from_point: &PointId,
        to_point: &PointId,
        splice: bool,
    ) -> GraphResult<Connection> {
        let a = self.point(from, from_point)?.clone();
        let b = self.point(to, to_point)?.clone();
        if from == to && from_point == to_point {
            return Err(GraphError::SelfConnection {
                node: from,
                point: from_point.clone(),
            });
        }
        for (node, point) in [(from, from_point), (to, to_point)] {
            if self.slot(node, point) != Some(SlotStatus::Available) {
                return Err(GraphError::PointAlreadyConnected {
                    node,
                    point: point.clone(),
                });
            }
        }

        let gap = distance(&a.position, &b.position);
        let kind = match classify(gap, a.shape() == b.shape(), &self.config) {
            ConnectionKind::FittingRequired if !splice => ConnectionKind::Direct,
            kind => kind,
        };
        let flow_direction = self.flow_direction(from, &a, to, &b);
        let id = self.connection_ids.allocate();
        let mut connection = Connection {
            id,
            from_node: from,
            from_point: from_point.clone(),
            to_node: to,
            to_point: to_point.clone(),
            kind,
            flow_direction,
            distance: gap,
            required_fitting: None,
            created_at: Utc::now(),
        };

        match kind {
            ConnectionKind::Invalid => {
                warn!(
                    connection = %id, from = %from, to = %to, gap,
                    "connection gap too wide; stored as invalid"
                );
                self.connections.insert(id, connection.clone());
                return Ok(connection);
            }
            ConnectionKind::FittingRequired => {
                let fitting_type = splice_type(a.shape(), b.shape());
                let (upstream, downstream) = match flow_direction {
                    FlowDirection::Reverse => (&b, &a),
                    _ => (&a, &b),
                };
                let fitting = self
                    .factory
                    .splice_fitting(fitting_type, upstream, downstream)?;
                let inlet = fitting.inlet.id.clone();
                let outlet = fitting.outlets.first().map(|p| p.id.clone()).ok_or(
                    ComponentError::InvalidArg {
                        what: "generated fitting has no outlet",
                    },
                )?;
                let node = self.insert_node(fitting.into());
                connection.required_fitting = Some(FittingSplice {
                    node,
                    inlet,
                    outlet,
                });
            }
            ConnectionKind::Direct => {}
        }

        self.wire(&connection);
        self.connections.insert(id, connection.clone());
        self.rebuild_dependencies();
        if let Err(err) = self.update_calculation_order() {
            self.rollback(&connection);
            warn!(connection = %id, %err, "connection rejected");
            return Err(err);
        }

        if let Some(splice) = &connection.required_fitting {
            self.events.push(TopologyEvent::NodeAdded {
                node: splice.node,
                kind: ElementKind::Fitting,
            });
        }
        self.mark_dirty(from);
        self.mark_dirty(to);
        debug!(connection = %id, ?kind, ?flow_direction, gap, "connection created");
        self.events.push(TopologyEvent::ConnectionCreated {
            connection: id,
            kind,
        });
        Ok(connection)
    }

    /// Remove a connection, freeing its slots and deleting any generated
    /// fitting. Returns false if it does not exist.
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let Some(endpoints) = self.detach_connection(id) else {
            return false;
        };
        self.rebuild_dependencies();
        self.refresh_order();
        for n in endpoints {
            self.mark_dirty(n);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Calculation bookkeeping
    // ---------------------------------------------------------------------

    /// Recompute the calculation order from current dependencies.
    pub fn update_calculation_order(&mut self) -> GraphResult<()> {
        let deps: BTreeMap<NodeId, BTreeSet<NodeId>> = self
            .nodes
            .iter()
            .map(|(id, n)| (*id, n.calc.dependencies.clone()))
            .collect();
        let order = topological_order(&deps)?;
        for (index, id) in order.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(id) {
                node.calc.order = index;
            }
        }
        self.order = order;
        Ok(())
    }

    /// Flag `node` and everything downstream of it for recalculation.
    /// Returns the flagged nodes, `node` first.
    pub fn mark_dirty(&mut self, node: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(&node) {
            return Vec::new();
        }
        let mut marked = vec![node];
        marked.extend(self.dependents(node));
        for id in &marked {
            if let Some(n) = self.nodes.get_mut(id) {
                n.invalidate();
            }
        }
        marked
    }

    pub fn mark_all_dirty(&mut self) {
        for node in self.nodes.values_mut() {
            node.invalidate();
        }
    }

    /// Returns false if the node does not exist.
    pub fn begin_calculation(&mut self, node: NodeId) -> bool {
        match self.nodes.get_mut(&node) {
            Some(n) => {
                n.calc.is_calculating = true;
                true
            }
            None => false,
        }
    }

    /// Store a successful result and clear the dirty flag.
    pub fn complete_calculation(
        &mut self,
        node: NodeId,
        mut flow: FlowProperties,
        at: DateTime<Utc>,
    ) -> GraphResult<()> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(GraphError::NodeNotFound(node))?;
        flow.is_calculated = true;
        flow.last_updated = Some(at);
        n.flow = flow;
        n.calc.needs_recalculation = false;
        n.calc.is_calculating = false;
        n.calc.last_calculated = Some(at);
        Ok(())
    }

    /// Leave the node dirty after a failed calculation.
    pub fn fail_calculation(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.calc.is_calculating = false;
            n.invalidate();
        }
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Take every event recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<TopologyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[TopologyEvent] {
        &self.events
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn insert_node(&mut self, element: NetworkElement) -> NodeId {
        let id = self.node_ids.allocate();
        self.nodes.insert(id, Node::new(id, element, &self.air));
        id
    }

    /// Which way air crosses a new connection.
    ///
    /// Sources always push air away. Otherwise port roles decide, and when
    /// they are ambiguous equipment feeding a segment is forward while a
    /// segment feeding equipment is reverse.
    fn flow_direction(
        &self,
        from: NodeId,
        a: &ConnectionPoint,
        to: NodeId,
        b: &ConnectionPoint,
    ) -> FlowDirection {
        let element = |id: NodeId| self.nodes.get(&id).map(Node::element);
        let (Some(src), Some(dst)) = (element(from), element(to)) else {
            return FlowDirection::Forward;
        };
        if src.is_flow_source() && !dst.is_flow_source() {
            return FlowDirection::Forward;
        }
        if dst.is_flow_source() && !src.is_flow_source() {
            return FlowDirection::Reverse;
        }
        match (a.role(), b.role()) {
            (PortRole::Outlet, PortRole::Inlet) => return FlowDirection::Forward,
            (PortRole::Inlet, PortRole::Outlet) => return FlowDirection::Reverse,
            _ => {}
        }
        match (src.kind(), dst.kind()) {
            (ElementKind::Segment, ElementKind::Equipment) => FlowDirection::Reverse,
            _ => FlowDirection::Forward,
        }
    }

    fn wire(&mut self, connection: &Connection) {
        for (node, point) in connection.occupied_slots() {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.set_slot(&point, SlotStatus::Connected(connection.id));
            }
        }
    }

    fn unwire(&mut self, connection: &Connection) {
        for (node, point) in connection.occupied_slots() {
            if let Some(n) = self.nodes.get_mut(&node) {
                if n.slot(&point) == Some(SlotStatus::Connected(connection.id)) {
                    n.set_slot(&point, SlotStatus::Available);
                }
            }
        }
    }

    fn rollback(&mut self, connection: &Connection) {
        self.unwire(connection);
        self.connections.remove(&connection.id);
        if let Some(splice) = &connection.required_fitting {
            self.nodes.remove(&splice.node);
        }
        self.rebuild_dependencies();
        self.refresh_order();
    }

    /// Unwire and delete a connection and its generated fitting without
    /// touching dependencies. Returns the surviving endpoint nodes.
    fn detach_connection(&mut self, id: ConnectionId) -> Option<Vec<NodeId>> {
        let connection = self.connections.remove(&id)?;
        self.unwire(&connection);
        if let Some(splice) = &connection.required_fitting {
            // The fitting may carry other connections if the user wired it further.
            let extra: Vec<ConnectionId> = self
                .connections
                .values()
                .filter(|c| c.involves(splice.node))
                .map(|c| c.id)
                .collect();
            for cid in extra {
                self.detach_connection(cid);
            }
            if self.nodes.remove(&splice.node).is_some() {
                self.events
                    .push(TopologyEvent::NodeRemoved { node: splice.node });
            }
        }
        debug!(connection = %id, "connection removed");
        self.events
            .push(TopologyEvent::ConnectionRemoved { connection: id });
        Some(
            [connection.from_node, connection.to_node]
                .into_iter()
                .filter(|n| self.nodes.contains_key(n))
                .collect(),
        )
    }

    fn rebuild_dependencies(&mut self) {
        let mut deps: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for connection in self.connections.values() {
            for (upstream, downstream) in connection.dependency_edges() {
                if self.nodes.contains_key(&upstream) && self.nodes.contains_key(&downstream) {
                    deps.entry(downstream).or_default().insert(upstream);
                }
            }
        }
        for (id, node) in self.nodes.iter_mut() {
            node.calc.dependencies = deps.remove(id).unwrap_or_default();
        }
    }

    /// Recompute the order after a mutation that cannot introduce a cycle.
    fn refresh_order(&mut self) {
        if let Err(err) = self.update_calculation_order() {
            warn!(%err, "calculation order unavailable");
        }
    }

    fn reverse_dependencies(&self) -> BTreeMap<NodeId, Vec<NodeId>> {
        let mut reverse: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for node in self.nodes.values() {
            for &dep in &node.calc.dependencies {
                reverse.entry(dep).or_default().push(node.id());
            }
        }
        reverse
    }
}
