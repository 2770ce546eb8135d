//! Topology error types.

use hvac_components::{ComponentError, PointId};
use hvac_core::{ConnectionId, HvacError, NodeId};
use thiserror::Error;

/// Errors raised by topology mutations and ordering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("Node {node} has no connection point '{point}'")]
    PointNotFound { node: NodeId, point: PointId },

    #[error("Connection point '{point}' on node {node} is already connected")]
    PointAlreadyConnected { node: NodeId, point: PointId },

    #[error("Connection point '{point}' on node {node} cannot connect to itself")]
    SelfConnection { node: NodeId, point: PointId },

    /// The dependency relation contains a cycle through `node`.
    #[error("Circular calculation dependency detected at node {node}")]
    CycleDetected { node: NodeId },

    #[error("Element error: {0}")]
    Component(#[from] ComponentError),
}

pub type GraphResult<T> = Result<T, GraphError>;

impl From<GraphError> for HvacError {
    fn from(err: GraphError) -> Self {
        let what = match err {
            GraphError::NodeNotFound(_) => "node not found",
            GraphError::ConnectionNotFound(_) => "connection not found",
            GraphError::PointNotFound { .. } => "connection point not found",
            GraphError::PointAlreadyConnected { .. } => "connection point already connected",
            GraphError::SelfConnection { .. } => "self connection",
            GraphError::CycleDetected { .. } => "circular calculation dependency",
            GraphError::Component(e) => return e.into(),
        };
        HvacError::Invariant { what }
    }
}
