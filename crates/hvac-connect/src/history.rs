//! Append-only log of connection attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hvac_components::PointId;
use hvac_core::{ConnectionId, NodeId};

use crate::validation::ValidationResult;

/// One call to `attempt_connection`, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionAttempt {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub from_node: NodeId,
    pub from_point: PointId,
    pub to_node: NodeId,
    pub to_point: PointId,
    pub success: bool,
    /// Connections created, in wiring order.
    pub connections: Vec<ConnectionId>,
    /// Fitting node inserted for this attempt, if any.
    pub fitting: Option<NodeId>,
    pub validation: ValidationResult,
    pub errors: Vec<String>,
}

/// Aggregate counts over the history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionStatistics {
    pub total_attempts: usize,
    pub successful: usize,
    pub failed: usize,
    pub fittings_inserted: usize,
    /// Fraction of attempts that succeeded, 0.0 with no attempts.
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionHistory {
    attempts: Vec<ConnectionAttempt>,
}

impl ConnectionHistory {
    pub fn record(&mut self, attempt: ConnectionAttempt) {
        self.attempts.push(attempt);
    }

    pub fn attempts(&self) -> &[ConnectionAttempt] {
        &self.attempts
    }

    pub fn last(&self) -> Option<&ConnectionAttempt> {
        self.attempts.last()
    }

    pub fn clear(&mut self) {
        self.attempts.clear();
    }

    pub fn statistics(&self) -> ConnectionStatistics {
        let total_attempts = self.attempts.len();
        let successful = self.attempts.iter().filter(|a| a.success).count();
        ConnectionStatistics {
            total_attempts,
            successful,
            failed: total_attempts - successful,
            fittings_inserted: self.attempts.iter().filter(|a| a.fitting.is_some()).count(),
            success_rate: if total_attempts == 0 {
                0.0
            } else {
                successful as f64 / total_attempts as f64
            },
        }
    }
}
