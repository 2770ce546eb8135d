//! Nodes: an element plus its calculation bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use hvac_components::{
    AirProperties, ConnectionPoint, ElementKind, FlowProperties, NetworkElement, PointId,
};
use hvac_core::{ConnectionId, NodeId};

/// Occupancy of one connection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Available,
    Connected(ConnectionId),
}

impl SlotStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotStatus::Available)
    }
}

/// Per-node calculation state.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationState {
    pub needs_recalculation: bool,
    pub is_calculating: bool,
    pub last_calculated: Option<DateTime<Utc>>,
    /// Nodes whose results this node's calculation reads.
    pub dependencies: BTreeSet<NodeId>,
    /// Position in the current calculation order.
    pub order: usize,
}

impl Default for CalculationState {
    fn default() -> Self {
        Self {
            needs_recalculation: true,
            is_calculating: false,
            last_calculated: None,
            dependencies: BTreeSet::new(),
            order: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    element: NetworkElement,
    slots: BTreeMap<PointId, SlotStatus>,
    pub(crate) flow: FlowProperties,
    pub(crate) calc: CalculationState,
}

impl Node {
    pub(crate) fn new(id: NodeId, element: NetworkElement, air: &AirProperties) -> Self {
        let slots = element
            .connection_points()
            .into_iter()
            .map(|p| (p.id.clone(), SlotStatus::Available))
            .collect();
        Self {
            id,
            element,
            slots,
            flow: FlowProperties::uncalculated(air),
            calc: CalculationState::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn element(&self) -> &NetworkElement {
        &self.element
    }

    pub fn flow(&self) -> &FlowProperties {
        &self.flow
    }

    pub fn calculation_state(&self) -> &CalculationState {
        &self.calc
    }

    pub fn is_dirty(&self) -> bool {
        self.calc.needs_recalculation
    }

    pub fn point(&self, id: &PointId) -> Option<&ConnectionPoint> {
        self.element.point(id)
    }

    pub fn slot(&self, id: &PointId) -> Option<SlotStatus> {
        self.slots.get(id).copied()
    }

    pub fn slots(&self) -> impl Iterator<Item = (&PointId, SlotStatus)> {
        self.slots.iter().map(|(id, s)| (id, *s))
    }

    /// Points not yet joined to anything.
    pub fn available_points(&self) -> Vec<&ConnectionPoint> {
        self.element
            .connection_points()
            .into_iter()
            .filter(|p| self.slot(&p.id).is_some_and(|s| s.is_available()))
            .collect()
    }

    /// Number of occupied slots.
    pub fn connected_count(&self) -> usize {
        self.slots.values().filter(|s| !s.is_available()).count()
    }

    pub(crate) fn set_slot(&mut self, point: &PointId, status: SlotStatus) {
        if let Some(slot) = self.slots.get_mut(point) {
            *slot = status;
        }
    }

    /// Swap in a new element. Slots whose point survives keep their status
    /// if `keep` says so; every other slot starts out available.
    pub(crate) fn replace_element(
        &mut self,
        element: NetworkElement,
        keep: impl Fn(&PointId) -> Option<SlotStatus>,
    ) {
        self.slots = element
            .connection_points()
            .into_iter()
            .map(|p| (p.id.clone(), keep(&p.id).unwrap_or(SlotStatus::Available)))
            .collect();
        self.element = element;
    }

    pub(crate) fn invalidate(&mut self) {
        self.calc.needs_recalculation = true;
        self.flow.is_calculated = false;
    }
}
