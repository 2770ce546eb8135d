//! Debounced, dependency-ordered recalculation.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use hvac_components::{CalculationContext, FlowCalculator, FlowProperties, LimitCheck};
use hvac_core::{Clock, NodeId, SystemClock};
use hvac_graph::{TopologyEvent, TopologyManager};

use crate::config::CalculationConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{CalculationEvent, CalculationListener};
use crate::results::{NodeCalculationResult, SystemCalculationResults};

/// Coalesces change triggers and recalculates dirty nodes in dependency
/// order once the debounce window has elapsed.
///
/// The engine never runs on its own: callers poll it. Time comes from the
/// injected [`Clock`] so tests can drive the debounce deterministically.
pub struct CalculationEngine<C: Clock = SystemClock> {
    config: CalculationConfig,
    clock: C,
    queue: BTreeSet<NodeId>,
    deadline: Option<Instant>,
    running: bool,
    pass_count: u64,
    last_results: Option<SystemCalculationResults>,
    listener: Option<CalculationListener>,
}

impl<C: Clock + std::fmt::Debug> std::fmt::Debug for CalculationEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculationEngine")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("queue", &self.queue)
            .field("deadline", &self.deadline)
            .field("running", &self.running)
            .field("pass_count", &self.pass_count)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for CalculationEngine<SystemClock> {
    fn default() -> Self {
        Self::new(CalculationConfig::default())
    }
}

impl CalculationEngine<SystemClock> {
    pub fn new(config: CalculationConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CalculationEngine<C> {
    pub fn with_clock(config: CalculationConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            queue: BTreeSet::new(),
            deadline: None,
            running: false,
            pass_count: 0,
            last_results: None,
            listener: None,
        }
    }

    /// Attach the listener that receives every [`CalculationEvent`].
    pub fn with_listener(mut self, listener: CalculationListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ---------------------------------------------------------------------
    // Triggers
    // ---------------------------------------------------------------------

    /// Mark `node` and its dependents dirty and restart the debounce window.
    /// Returns false if the node does not exist.
    pub fn trigger_calculation(&mut self, topology: &mut TopologyManager, node: NodeId) -> bool {
        let marked = topology.mark_dirty(node);
        if marked.is_empty() {
            return false;
        }
        debug!(node = %node, dirty = marked.len(), "calculation triggered");
        self.queue.insert(node);
        self.schedule();
        true
    }

    /// Mark every node dirty and restart the debounce window.
    pub fn trigger_system_calculation(&mut self, topology: &mut TopologyManager) {
        topology.mark_all_dirty();
        self.queue.extend(topology.iter_nodes().map(|n| n.id()));
        debug!(nodes = self.queue.len(), "system calculation triggered");
        self.schedule();
    }

    /// React to a topology change.
    pub fn handle_event(&mut self, topology: &mut TopologyManager, event: &TopologyEvent) {
        match event {
            TopologyEvent::NodeAdded { node, .. } | TopologyEvent::NodeUpdated { node, .. } => {
                self.trigger_calculation(topology, *node);
            }
            TopologyEvent::ConnectionCreated { connection, .. } => {
                let involved = match topology.connection(*connection) {
                    Some(c) => {
                        let mut nodes = vec![c.from_node, c.to_node];
                        if let Some(splice) = &c.required_fitting {
                            nodes.push(splice.node);
                        }
                        nodes
                    }
                    None => Vec::new(),
                };
                for node in involved {
                    self.trigger_calculation(topology, node);
                }
            }
            TopologyEvent::NodeRemoved { node } => {
                self.queue.remove(node);
                self.schedule_if_dirty(topology);
            }
            TopologyEvent::ConnectionRemoved { .. } => self.schedule_if_dirty(topology),
        }
    }

    fn schedule(&mut self) {
        self.deadline = Some(self.clock.now() + self.config.debounce());
    }

    fn schedule_if_dirty(&mut self, topology: &TopologyManager) {
        if topology.iter_nodes().any(|n| n.is_dirty()) {
            self.schedule();
        }
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// True while a pass is waiting for its debounce window to close.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the pending pass becomes due.
    pub fn time_until_due(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(self.clock.now()))
    }

    /// Nodes triggered since the last pass.
    pub fn queued(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.queue.iter().copied()
    }

    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    pub fn last_results(&self) -> Option<&SystemCalculationResults> {
        self.last_results.as_ref()
    }

    /// Run a pass if the debounce window has elapsed.
    pub fn poll(&mut self, topology: &mut TopologyManager) -> Option<SystemCalculationResults> {
        let due = self.deadline.is_some_and(|d| self.clock.now() >= d);
        if !due {
            return None;
        }
        self.deadline = None;
        self.execute_calculations(topology)
    }

    /// Skip the debounce and run a pass immediately.
    pub fn calculate_now(
        &mut self,
        topology: &mut TopologyManager,
    ) -> Option<SystemCalculationResults> {
        self.deadline = None;
        self.execute_calculations(topology)
    }

    // ---------------------------------------------------------------------
    // Passes
    // ---------------------------------------------------------------------

    /// Recalculate every dirty node in calculation order, then validate the
    /// whole topology. Returns `None` if a pass is already running.
    pub fn execute_calculations(
        &mut self,
        topology: &mut TopologyManager,
    ) -> Option<SystemCalculationResults> {
        if self.running {
            debug!("calculation pass already running, skipped");
            return None;
        }
        self.running = true;
        self.queue.clear();
        let started = self.clock.now();

        let mut summary = SystemCalculationResults {
            total_elements: topology.node_count(),
            ..Default::default()
        };

        if let Err(err) = topology.update_calculation_order() {
            warn!(error = %err, "calculation order unavailable");
            summary.system_errors.push(err.to_string());
            summary.failed_elements = topology.dirty_nodes().len();
            return Some(self.finish(summary, started));
        }

        for node in topology.dirty_nodes() {
            let result = self.calculate_node(topology, node);
            if result.success {
                summary.calculated_elements += 1;
            } else {
                summary.failed_elements += 1;
            }
            summary.system_warnings.extend(
                result
                    .warnings
                    .iter()
                    .map(|w| format!("'{}': {w}", result.name)),
            );
            summary.system_errors.extend(
                result
                    .errors
                    .iter()
                    .map(|e| format!("'{}': {e}", result.name)),
            );
            summary.results.push(result);
        }

        let validation = topology.validate_topology(&self.config.limits);
        summary
            .system_warnings
            .extend(validation.warnings().into_iter().map(str::to_owned));
        summary
            .system_errors
            .extend(validation.errors().into_iter().map(str::to_owned));
        summary.system_valid = summary.failed_elements == 0 && validation.is_valid;

        Some(self.finish(summary, started))
    }

    fn finish(
        &mut self,
        mut summary: SystemCalculationResults,
        started: Instant,
    ) -> SystemCalculationResults {
        summary.total_calculation_time = self.clock.now().saturating_duration_since(started);
        self.pass_count += 1;
        self.running = false;
        info!(
            pass = self.pass_count,
            calculated = summary.calculated_elements,
            failed = summary.failed_elements,
            valid = summary.system_valid,
            "calculation pass finished"
        );
        self.last_results = Some(summary.clone());
        self.emit(&CalculationEvent::SystemCalculationCompleted(summary.clone()));
        summary
    }

    fn calculate_node(
        &mut self,
        topology: &mut TopologyManager,
        node: NodeId,
    ) -> NodeCalculationResult {
        let started = self.clock.now();
        topology.begin_calculation(node);
        self.emit(&CalculationEvent::CalculationStarted { node });

        let (name, kind) = match topology.node(node) {
            Some(n) => (n.element().name().to_owned(), n.kind()),
            None => (node.to_string(), hvac_components::ElementKind::Segment),
        };

        let mut result = NodeCalculationResult {
            node,
            name,
            kind,
            success: false,
            flow: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            duration: Duration::ZERO,
        };

        let outcome = self.evaluate(topology, node).and_then(|(flow, check)| {
            result.flow = Some(flow.clone());
            result.warnings = check.warnings;
            if check.errors.is_empty() {
                topology.complete_calculation(node, flow, Utc::now())?;
                Ok(())
            } else {
                Err(EngineError::LimitViolation(check.errors.join("; ")))
            }
        });

        match outcome {
            Ok(()) => {
                result.success = true;
                for w in &result.warnings {
                    warn!(node = %node, name = %result.name, "{w}");
                }
                result.duration = self.clock.now().saturating_duration_since(started);
                self.emit(&CalculationEvent::CalculationCompleted(result.clone()));
            }
            Err(err) => {
                topology.fail_calculation(node);
                let message = err.to_string();
                warn!(node = %node, name = %result.name, error = %message, "calculation failed");
                result.errors.push(message.clone());
                result.duration = self.clock.now().saturating_duration_since(started);
                self.emit(&CalculationEvent::CalculationError { node, message });
            }
        }
        result
    }

    /// Compute the node's flow and its limit findings without storing them.
    fn evaluate(
        &self,
        topology: &TopologyManager,
        node: NodeId,
    ) -> EngineResult<(FlowProperties, LimitCheck)> {
        let element = topology
            .node(node)
            .ok_or(EngineError::NodeNotFound(node))?
            .element();
        let ctx = CalculationContext::new(
            &self.config.air,
            &self.config.coefficients,
            self.config.fallback_velocity,
        )
        .with_upstream(topology.upstream_airflow(node));
        let flow = element.calculate(&ctx)?;
        let check = self.config.limits.check(&flow);
        Ok((flow, check))
    }

    fn emit(&mut self, event: &CalculationEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }
}
