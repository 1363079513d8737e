//! Session context.
//!
//! Routing consistency is tracked per session, not per connection: a session
//! that wrote to the master keeps reading from it for as long as it lives.
//! The session is passed explicitly to every connection it acquires, so
//! concurrent sessions never see each other's state.

use std::fmt::Display;

use uuid::Uuid;

pub mod tracker;

pub use tracker::{Consistency, Hint, RoutingConsistencyTracker};

/// Logical session, e.g. one request or one worker.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    tracker: RoutingConsistencyTracker,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            tracker: RoutingConsistencyTracker::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        SessionId(self.id)
    }

    pub fn tracker(&self) -> &RoutingConsistencyTracker {
        &self.tracker
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Session identifier, shortened for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "session {}", &simple[..8])
    }
}
