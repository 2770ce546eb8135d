//! Mutation events queued by the topology.
//!
//! The topology never calls out while it is being mutated. It records what
//! changed and the owner drains the queue afterwards, typically forwarding
//! each event to the calculation engine.

use hvac_components::ElementKind;
use hvac_core::{ConnectionId, NodeId};

use crate::connection::ConnectionKind;

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyEvent {
    NodeAdded { node: NodeId, kind: ElementKind },
    NodeUpdated { node: NodeId, kind: ElementKind },
    NodeRemoved { node: NodeId },
    ConnectionCreated { connection: ConnectionId, kind: ConnectionKind },
    ConnectionRemoved { connection: ConnectionId },
}

impl TopologyEvent {
    /// Node the change is anchored on, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            TopologyEvent::NodeAdded { node, .. }
            | TopologyEvent::NodeUpdated { node, .. }
            | TopologyEvent::NodeRemoved { node } => Some(*node),
            TopologyEvent::ConnectionCreated { .. } | TopologyEvent::ConnectionRemoved { .. } => {
                None
            }
        }
    }
}
