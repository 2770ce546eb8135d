//! Calculation notifications.

use hvac_core::NodeId;

use crate::results::{NodeCalculationResult, SystemCalculationResults};

#[derive(Debug, Clone, PartialEq)]
pub enum CalculationEvent {
    CalculationStarted { node: NodeId },
    CalculationCompleted(NodeCalculationResult),
    CalculationError { node: NodeId, message: String },
    SystemCalculationCompleted(SystemCalculationResults),
}

/// Callback fixed when the engine is constructed.
pub type CalculationListener = Box<dyn FnMut(&CalculationEvent)>;
