//! Per-node and per-pass calculation results.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use hvac_components::{ElementKind, FlowProperties};
use hvac_core::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCalculationResult {
    pub node: NodeId,
    pub name: String,
    pub kind: ElementKind,
    pub success: bool,
    /// The computed state, present even when a limit error rejected it.
    pub flow: Option<FlowProperties>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub duration: Duration,
}

/// Summary of one calculation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemCalculationResults {
    /// Nodes in the topology when the pass ran.
    pub total_elements: usize,
    pub calculated_elements: usize,
    pub failed_elements: usize,
    pub total_calculation_time: Duration,
    /// No node failed and topology validation found no errors.
    pub system_valid: bool,
    pub results: Vec<NodeCalculationResult>,
    pub system_warnings: Vec<String>,
    pub system_errors: Vec<String>,
}

impl SystemCalculationResults {
    pub fn result_for(&self, node: NodeId) -> Option<&NodeCalculationResult> {
        self.results.iter().find(|r| r.node == node)
    }
}
