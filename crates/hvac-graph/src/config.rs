//! Connection classification thresholds used by the topology.

use serde::{Deserialize, Serialize};

/// Gap thresholds, in inches, for classifying a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Gaps at or below this join directly.
    pub direct_tolerance: f64,
    /// Gaps above `direct_tolerance` and at or below this are bridged by a
    /// generated fitting. Anything wider is invalid.
    pub max_fitting_distance: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            direct_tolerance: 0.5,
            max_fitting_distance: 12.0,
        }
    }
}
