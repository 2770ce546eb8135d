//! Application service layer for the HVAC network engine.
//!
//! This crate gives front ends a single entry point: [`HvacNetwork`] owns a
//! topology, its connection manager and its calculation engine and keeps them
//! in step, while [`HvacConfig`] loads every tunable from YAML or JSON.

pub mod config;
pub mod demo;
pub mod error;
pub mod network;

// Re-export key types for convenience
pub use config::HvacConfig;
pub use demo::DemoNodes;
pub use error::{AppError, AppResult};
pub use network::HvacNetwork;
