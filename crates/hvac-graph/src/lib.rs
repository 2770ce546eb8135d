//! hvac-graph: topology layer for duct networks.
//!
//! Provides:
//! - Mutable network topology (nodes, connections, connection slots)
//! - Calculation dependencies derived from wired connections
//! - Topological calculation order with cycle detection
//! - Queued topology events and structural validation
//!
//! # Example
//!
//! ```
//! use hvac_components::ElementFactory;
//! use hvac_core::Point3;
//! use hvac_graph::{ConnectionKind, TopologyManager};
//!
//! let factory = ElementFactory::default();
//! let mut topo = TopologyManager::new();
//! let a = topo.add_node(
//!     factory
//!         .round_segment("a", Point3::origin(), Point3::new(120.0, 0.0, 0.0), 12.0)
//!         .unwrap(),
//! );
//! let b = topo.add_node(
//!     factory
//!         .round_segment("b", Point3::new(120.0, 0.0, 0.0), Point3::new(240.0, 0.0, 0.0), 12.0)
//!         .unwrap(),
//! );
//! let c = topo
//!     .create_connection(a, b, &"outlet".into(), &"inlet".into())
//!     .unwrap();
//!
//! assert_eq!(c.kind, ConnectionKind::Direct);
//! assert_eq!(topo.calculation_order(), &[a, b]);
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod node;
pub mod order;
pub mod topology;
pub mod validate;

// Re-exports for ergonomics
pub use config::TopologyConfig;
pub use connection::{Connection, ConnectionKind, FittingSplice, FlowDirection};
pub use error::{GraphError, GraphResult};
pub use events::TopologyEvent;
pub use node::{CalculationState, Node, SlotStatus};
pub use topology::TopologyManager;
pub use validate::{Severity, SystemPath, TopologyIssue, TopologyValidationResult};
