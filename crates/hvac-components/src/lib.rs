//! hvac-components: element library for duct networks.
//!
//! Provides:
//! - Element payloads (duct segments, equipment, fittings) and their connection points
//! - An `ElementFactory` that builds well-formed elements with declared ports
//! - Per-kind flow calculators (friction, K-factor and pass-through loss models)
//! - Engineering limit checks applied after each calculation
//!
//! All calculators implement the `FlowCalculator` trait and are deterministic
//! functions of the element and its upstream airflow.
//!
//! # Example
//!
//! ```
//! use hvac_components::{CalculationContext, ElementFactory, FlowCalculator};
//! use hvac_core::Point3;
//!
//! let factory = ElementFactory::default();
//! let duct = factory
//!     .rectangular_segment("main", Point3::origin(), Point3::new(120.0, 0.0, 0.0), 12.0, 12.0)
//!     .unwrap();
//!
//! let ctx = CalculationContext::standard().with_upstream(Some(2000.0));
//! let flow = duct.calculate(&ctx).unwrap();
//! assert_eq!(flow.velocity, 2000.0);
//! ```

pub mod calculator;
pub mod coefficients;
pub mod common;
pub mod element;
pub mod error;
pub mod factory;
pub mod flow;
pub mod friction;
pub mod limits;
pub mod point;
pub mod profile;

// Re-exports
pub use calculator::{CalculationContext, FlowCalculator};
pub use coefficients::{EquipmentCoefficients, FittingCoefficients, LossCoefficients};
pub use element::{
    DuctSegment, ElementKind, Equipment, EquipmentCapacity, EquipmentKind, Fitting, FittingType,
    NetworkElement,
};
pub use error::{ComponentError, ComponentResult};
pub use factory::ElementFactory;
pub use flow::{AirProperties, FlowProperties};
pub use limits::{FlowLimits, LimitCheck};
pub use point::{ConnectionPoint, PointId, PortRole};
pub use profile::{DuctMaterial, DuctProfile, Shape};
