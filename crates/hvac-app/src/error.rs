//! Error types for the hvac-app service layer.

use std::path::PathBuf;

use hvac_components::ComponentError;
use hvac_connect::ConnectError;
use hvac_core::NodeId;
use hvac_graph::GraphError;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI a single error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Element error: {0}")]
    Component(#[from] ComponentError),

    #[error("Topology error: {0}")]
    Graph(#[from] GraphError),

    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Result type for hvac-app operations.
pub type AppResult<T> = Result<T, AppError>;
