//! Geometric thresholds for joining connection points.
//!
//! Positions and diameters are in inches, areas in square inches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Points further apart than this never connect.
    pub max_distance: f64,
    /// A direct join needs the gap at or below this...
    pub direct_distance: f64,
    /// ...and alignment at or above this.
    pub direct_alignment: f64,
    /// Gaps up to this can be closed with an extension or flex connector...
    pub extension_distance: f64,
    /// ...when alignment is at least this.
    pub extension_alignment: f64,
    /// Below this alignment an elbow is needed.
    pub elbow_alignment: f64,
    /// Round diameters within this are directly compatible.
    pub round_diameter_tolerance: f64,
    /// Round diameters within this can be reduced.
    pub round_transition_limit: f64,
    /// Rectangular areas within this are directly compatible.
    pub rect_area_tolerance: f64,
    /// Rectangular areas within this can be reduced.
    pub rect_transition_limit: f64,
    /// Suggest fittings instead of rejecting mismatches.
    pub auto_fitting: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_distance: 12.0,
            direct_distance: 1.0,
            direct_alignment: 0.9,
            extension_distance: 6.0,
            extension_alignment: 0.7,
            elbow_alignment: 0.8,
            round_diameter_tolerance: 0.5,
            round_transition_limit: 6.0,
            rect_area_tolerance: 0.25,
            rect_transition_limit: 36.0,
            auto_fitting: true,
        }
    }
}

impl ConnectionConfig {
    /// Same thresholds with fitting suggestions turned off.
    pub fn strict() -> Self {
        Self {
            auto_fitting: false,
            ..Self::default()
        }
    }
}
