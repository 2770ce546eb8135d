//! Per-node calculation errors.

use hvac_components::ComponentError;
use hvac_core::NodeId;
use hvac_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Calculation failed: {0}")]
    Component(#[from] ComponentError),

    #[error("Topology error: {0}")]
    Graph(#[from] GraphError),

    /// The result breaks a hard engineering limit.
    #[error("{0}")]
    LimitViolation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
