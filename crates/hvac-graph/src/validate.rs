//! Structural and flow validation of the whole topology.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use hvac_components::{FlowLimits, NetworkElement};
use hvac_core::{ConnectionId, NodeId};

use crate::node::Node;
use crate::order::topological_order;
use crate::topology::TopologyManager;

/// Relative inflow/outflow mismatch tolerated at a node.
pub const FLOW_BALANCE_TOLERANCE: f64 = 0.05;

/// Upper bound on enumerated paths per source.
const MAX_PATHS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyIssue {
    pub severity: Severity,
    pub node: Option<NodeId>,
    pub connection: Option<ConnectionId>,
    pub message: String,
}

/// Snapshot report produced by [`TopologyManager::validate_topology`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopologyValidationResult {
    /// False if any issue is an error or critical.
    pub is_valid: bool,
    pub isolated_nodes: Vec<NodeId>,
    pub invalid_connections: Vec<ConnectionId>,
    pub issues: Vec<TopologyIssue>,
}

impl TopologyValidationResult {
    pub fn warnings(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .map(|i| i.message.as_str())
            .collect()
    }

    /// Error and critical messages.
    pub fn errors(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.severity >= Severity::Error)
            .map(|i| i.message.as_str())
            .collect()
    }

    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }
}

/// A simple downstream path from a source to a terminal node.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemPath {
    pub nodes: Vec<NodeId>,
    /// Sum of the calculated losses along the path, sources excluded (in. w.g.).
    pub total_pressure_drop: f64,
    /// Sum of duct segment lengths along the path (ft).
    pub total_length_ft: f64,
}

/// Loss a node contributes to a path. Sources supply pressure rather than
/// consume it, and uncalculated nodes contribute nothing yet.
fn path_loss(node: &Node) -> f64 {
    if node.element().is_flow_source() || !node.flow().is_calculated {
        0.0
    } else {
        node.flow().pressure_drop
    }
}

fn path_length_ft(node: &Node) -> f64 {
    match node.element() {
        NetworkElement::Segment(s) => s.length_ft(),
        NetworkElement::Equipment(_) | NetworkElement::Fitting(_) => 0.0,
    }
}

impl TopologyManager {
    /// Check the network for structural and flow problems.
    ///
    /// Pure and deterministic: two calls with no mutation in between return
    /// identical results.
    pub fn validate_topology(&self, limits: &FlowLimits) -> TopologyValidationResult {
        let mut result = TopologyValidationResult::default();

        for node in self.iter_nodes() {
            if node.connected_count() == 0 {
                result.isolated_nodes.push(node.id());
                result.issues.push(TopologyIssue {
                    severity: Severity::Warning,
                    node: Some(node.id()),
                    connection: None,
                    message: format!(
                        "Node {} ('{}') is not connected to anything",
                        node.id(),
                        node.element().name()
                    ),
                });
            }
        }

        for c in self.iter_connections().filter(|c| !c.is_wired()) {
            result.invalid_connections.push(c.id);
            result.issues.push(TopologyIssue {
                severity: Severity::Error,
                node: Some(c.from_node),
                connection: Some(c.id),
                message: format!(
                    "Connection {} between nodes {} and {} is invalid: gap {:.2} in exceeds {:.2} in",
                    c.id,
                    c.from_node,
                    c.to_node,
                    c.distance,
                    self.config().max_fitting_distance
                ),
            });
        }

        let deps: BTreeMap<NodeId, BTreeSet<NodeId>> = self
            .iter_nodes()
            .map(|n| (n.id(), n.calculation_state().dependencies.clone()))
            .collect();
        let order = match topological_order(&deps) {
            Ok(order) => order,
            Err(err) => {
                result.issues.push(TopologyIssue {
                    severity: Severity::Critical,
                    node: None,
                    connection: None,
                    message: err.to_string(),
                });
                result.is_valid = false;
                return result;
            }
        };

        self.check_flow_balance(&mut result);
        self.check_system_pressure(&order, limits, &mut result);

        result.is_valid = result.issues.iter().all(|i| i.severity == Severity::Warning);
        result
    }

    fn check_flow_balance(&self, result: &mut TopologyValidationResult) {
        for node in self.iter_nodes().filter(|n| n.flow().is_calculated) {
            let downstream: Vec<&Node> = self
                .direct_dependents(node.id())
                .into_iter()
                .filter_map(|id| self.node(id))
                .collect();
            if downstream.is_empty() || downstream.iter().any(|d| !d.flow().is_calculated) {
                continue;
            }
            let inflow = node.flow().airflow;
            let outflow: f64 = downstream.iter().map(|d| d.flow().airflow).sum();
            if inflow.abs() > f64::EPSILON
                && (outflow - inflow).abs() > FLOW_BALANCE_TOLERANCE * inflow.abs()
            {
                result.issues.push(TopologyIssue {
                    severity: Severity::Warning,
                    node: Some(node.id()),
                    connection: None,
                    message: format!(
                        "Flow imbalance at '{}': {:.0} CFM in, {:.0} CFM out",
                        node.element().name(),
                        inflow,
                        outflow
                    ),
                });
            }
        }
    }

    /// Longest accumulated loss over the dependency DAG, compared against
    /// the system limit and the static pressure of the feeding source.
    fn check_system_pressure(
        &self,
        order: &[NodeId],
        limits: &FlowLimits,
        result: &mut TopologyValidationResult,
    ) {
        let mut best: BTreeMap<NodeId, (f64, Option<NodeId>)> = BTreeMap::new();
        for id in order {
            let Some(node) = self.node(*id) else { continue };
            let upstream = node
                .calculation_state()
                .dependencies
                .iter()
                .filter_map(|d| best.get(d).map(|(loss, _)| (*loss, *d)))
                .max_by(|a, b| a.0.total_cmp(&b.0));
            let (inherited, pred) = match upstream {
                Some((loss, d)) => (loss, Some(d)),
                None => (0.0, None),
            };
            best.insert(*id, (inherited + path_loss(node), pred));
        }

        let Some((&end, &(loss, _))) = best.iter().max_by(|a, b| a.1.0.total_cmp(&b.1.0)) else {
            return;
        };
        if loss > limits.max_system_pressure {
            result.issues.push(TopologyIssue {
                severity: Severity::Error,
                node: Some(end),
                connection: None,
                message: format!(
                    "System pressure loss {:.2} in. w.g. along the critical path exceeds {:.2} in. w.g. limit",
                    loss, limits.max_system_pressure
                ),
            });
        }

        let mut source = end;
        while let Some(&(_, Some(pred))) = best.get(&source) {
            source = pred;
        }
        if let Some(NetworkElement::Equipment(eq)) = self.node(source).map(Node::element) {
            if eq.is_source && loss > eq.capacity.static_pressure {
                result.issues.push(TopologyIssue {
                    severity: Severity::Warning,
                    node: Some(source),
                    connection: None,
                    message: format!(
                        "'{}' supplies {:.2} in. w.g. but the critical path loses {:.2} in. w.g.",
                        eq.name, eq.capacity.static_pressure, loss
                    ),
                });
            }
        }
    }

    /// Every simple downstream path from `source` to a node with no dependents.
    pub fn find_paths_from(&self, source: NodeId) -> Vec<SystemPath> {
        let Some(start) = self.node(source) else {
            return Vec::new();
        };
        let mut paths = Vec::new();
        let mut stack: Vec<Vec<NodeId>> = vec![vec![start.id()]];
        while let Some(path) = stack.pop() {
            if paths.len() >= MAX_PATHS {
                break;
            }
            let Some(&last) = path.last() else { continue };
            let next: Vec<NodeId> = self
                .direct_dependents(last)
                .into_iter()
                .filter(|n| !path.contains(n))
                .collect();
            if next.is_empty() {
                paths.push(self.summarize(path));
                continue;
            }
            for n in next.into_iter().rev() {
                let mut extended = path.clone();
                extended.push(n);
                stack.push(extended);
            }
        }
        paths
    }

    /// The path with the highest accumulated loss from any root node.
    pub fn critical_path(&self) -> Option<SystemPath> {
        self.iter_nodes()
            .filter(|n| n.calculation_state().dependencies.is_empty())
            .flat_map(|n| self.find_paths_from(n.id()))
            .max_by(|a, b| a.total_pressure_drop.total_cmp(&b.total_pressure_drop))
    }

    fn summarize(&self, nodes: Vec<NodeId>) -> SystemPath {
        let (pressure, length) = nodes
            .iter()
            .filter_map(|id| self.node(*id))
            .fold((0.0, 0.0), |(p, l), n| (p + path_loss(n), l + path_length_ft(n)));
        SystemPath {
            nodes,
            total_pressure_drop: pressure,
            total_length_ft: length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hvac_components::{DuctProfile, ElementFactory, FlowProperties, PointId};
    use hvac_core::{Point3, Vector3};

    fn seg(x0: f64, x1: f64) -> NetworkElement {
        ElementFactory::default()
            .round_segment("duct", Point3::new(x0, 0.0, 0.0), Point3::new(x1, 0.0, 0.0), 12.0)
            .unwrap()
            .into()
    }

    fn join(topo: &mut TopologyManager, a: NodeId, b: NodeId) {
        let (o, i): (PointId, PointId) = ("outlet".into(), "inlet".into());
        topo.create_connection(a, b, &o, &i).unwrap();
    }

    fn solve(topo: &mut TopologyManager, id: NodeId, airflow: f64, pressure_drop: f64) {
        let flow = FlowProperties {
            airflow,
            pressure_drop,
            ..FlowProperties::default()
        };
        topo.complete_calculation(id, flow, Utc::now()).unwrap();
    }

    #[test]
    fn isolated_and_invalid_are_reported() {
        let mut topo = TopologyManager::new();
        let a = topo.add_node(seg(0.0, 120.0));
        let b = topo.add_node(seg(300.0, 400.0));
        join(&mut topo, a, b);

        let report = topo.validate_topology(&FlowLimits::default());
        assert!(!report.is_valid);
        assert_eq!(report.isolated_nodes, vec![a, b]);
        assert_eq!(report.invalid_connections.len(), 1);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.warnings().len(), 2);
    }

    #[test]
    fn validation_is_idempotent() {
        let mut topo = TopologyManager::new();
        let a = topo.add_node(seg(0.0, 120.0));
        let b = topo.add_node(seg(120.0, 240.0));
        join(&mut topo, a, b);
        let limits = FlowLimits::default();
        assert_eq!(topo.validate_topology(&limits), topo.validate_topology(&limits));
    }

    #[test]
    fn branch_imbalance_is_a_warning() {
        let mut topo = TopologyManager::new();
        let a = topo.add_node(seg(0.0, 120.0));
        let b = topo.add_node(seg(120.0, 240.0));
        join(&mut topo, a, b);
        solve(&mut topo, a, 1000.0, 0.1);
        solve(&mut topo, b, 800.0, 0.1);

        let report = topo.validate_topology(&FlowLimits::default());
        assert!(report.is_valid);
        assert!(report.warnings().iter().any(|w| w.contains("Flow imbalance")));
    }

    #[test]
    fn critical_path_over_limit_is_an_error() {
        let mut topo = TopologyManager::new();
        let a = topo.add_node(seg(0.0, 120.0));
        let b = topo.add_node(seg(120.0, 240.0));
        let c = topo.add_node(seg(240.0, 360.0));
        join(&mut topo, a, b);
        join(&mut topo, b, c);
        for id in [a, b, c] {
            solve(&mut topo, id, 1000.0, 2.5);
        }

        let report = topo.validate_topology(&FlowLimits::default());
        assert!(!report.is_valid);
        assert!(report.errors()[0].contains("7.50"));

        let path = topo.critical_path().unwrap();
        assert_eq!(path.nodes, vec![a, b, c]);
        assert!((path.total_pressure_drop - 7.5).abs() < 1e-12);
        assert!((path.total_length_ft - 30.0).abs() < 1e-9);
    }

    #[test]
    fn paths_follow_every_branch() {
        let factory = ElementFactory::default();
        let mut topo = TopologyManager::new();
        let tee = factory
            .tee(
                "tee",
                Point3::new(126.0, 0.0, 0.0),
                Vector3::x(),
                Vector3::y(),
                DuctProfile::round(12.0),
                DuctProfile::round(12.0),
            )
            .unwrap();
        let main = topo.add_node(seg(0.0, 120.0));
        let t = topo.add_node(tee);
        let run = topo.add_node(seg(132.0, 240.0));
        let branch = topo.add_node(
            factory
                .round_segment(
                    "branch",
                    Point3::new(126.0, 6.0, 0.0),
                    Point3::new(126.0, 120.0, 0.0),
                    12.0,
                )
                .unwrap(),
        );
        join(&mut topo, main, t);
        join(&mut topo, t, run);
        topo.create_connection(t, branch, &"branch".into(), &"inlet".into())
            .unwrap();

        let paths = topo.find_paths_from(main);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.nodes[..2] == [main, t]));
        assert!(paths.iter().any(|p| p.nodes.last() == Some(&run)));
        assert!(paths.iter().any(|p| p.nodes.last() == Some(&branch)));
        assert!(topo.find_paths_from(NodeId::from_index(77)).is_empty());
    }
}
