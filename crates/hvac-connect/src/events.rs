//! Notifications sent to the connection listener.

use crate::history::ConnectionAttempt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    ConnectionCreated(ConnectionAttempt),
    ConnectionFailed(ConnectionAttempt),
}

impl ConnectionEvent {
    pub fn attempt(&self) -> &ConnectionAttempt {
        match self {
            ConnectionEvent::ConnectionCreated(a) | ConnectionEvent::ConnectionFailed(a) => a,
        }
    }
}

/// Callback fixed when the manager is constructed.
pub type ConnectionListener = Box<dyn FnMut(&ConnectionEvent)>;
