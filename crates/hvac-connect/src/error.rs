//! Errors raised while materializing a validated connection.
//!
//! Validation problems are reported as values in `ValidationResult`; these
//! only surface when the topology refuses a wiring step.

use hvac_components::ComponentError;
use hvac_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectError {
    #[error("Topology rejected connection: {0}")]
    Graph(#[from] GraphError),

    #[error("Could not build fitting: {0}")]
    Component(#[from] ComponentError),

    #[error("Validation failed: {0}")]
    Rejected(String),
}

pub type ConnectResult<T> = Result<T, ConnectError>;
