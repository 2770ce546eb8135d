//! hvac-connect: connection point management.
//!
//! Decides whether two connection points can be joined (distance,
//! alignment, shape, size), suggests the fitting needed to bridge a
//! mismatch, and materializes accepted joins in a `TopologyManager`.
//!
//! Validation never mutates anything; problems come back as values in a
//! [`ValidationResult`].

pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod manager;
pub mod validation;

// Re-exports
pub use config::ConnectionConfig;
pub use error::{ConnectError, ConnectResult};
pub use events::{ConnectionEvent, ConnectionListener};
pub use history::{ConnectionAttempt, ConnectionHistory, ConnectionStatistics};
pub use manager::{ConnectionPointManager, NearbyPoint};
pub use validation::{
    FittingSuggestion, SizeCompatibility, ValidationResult, size_compatibility,
    validate_connection, validate_points,
};
