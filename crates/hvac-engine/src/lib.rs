//! hvac-engine: debounced flow recalculation over an HVAC topology.
//!
//! Topology changes mark nodes dirty and restart a debounce window. Once the
//! window closes, a poll runs one pass that recalculates every dirty node in
//! dependency order, applies the engineering limits and validates the whole
//! network.
//!
//! # Example
//!
//! ```
//! use hvac_components::{DuctProfile, ElementFactory};
//! use hvac_core::{Point3, Vector3};
//! use hvac_engine::{CalculationConfig, CalculationEngine};
//! use hvac_graph::TopologyManager;
//!
//! let factory = ElementFactory::default();
//! let mut topology = TopologyManager::new();
//! let fan = topology.add_node(
//!     factory
//!         .fan("fan", Point3::origin(), Vector3::x(), DuctProfile::round(12.0), 600.0, 1.0)
//!         .unwrap(),
//! );
//!
//! let mut engine = CalculationEngine::new(CalculationConfig::default());
//! engine.trigger_calculation(&mut topology, fan);
//! let results = engine.calculate_now(&mut topology).unwrap();
//! assert_eq!(results.calculated_elements, 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod results;

// Re-exports
pub use config::CalculationConfig;
pub use engine::CalculationEngine;
pub use error::{EngineError, EngineResult};
pub use events::{CalculationEvent, CalculationListener};
pub use results::{NodeCalculationResult, SystemCalculationResults};
