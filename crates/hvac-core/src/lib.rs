//! hvac-core: stable foundation for the HVAC network engine.
//!
//! Contains:
//! - units (uom conversions for the inch/foot/CFM/FPM convention)
//! - numeric (Real, geometry tolerance, finiteness checks)
//! - ids (stable compact IDs for nodes and connections)
//! - geometry (nalgebra points/vectors, distance and alignment)
//! - clock (injectable time source for debounced scheduling)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{HvacError, HvacResult};
pub use geometry::{Point3, Vector3};
pub use ids::*;
pub use numeric::*;
