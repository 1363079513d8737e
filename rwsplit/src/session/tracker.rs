//! Read-after-write consistency.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::topology::Topology;

/// Explicit routing directive set out-of-band by the hint mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    /// Send everything to the master.
    MasterOnly,
    /// Send everything to this data source.
    DataSource(String),
}

/// Where the session is in the consistency state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    /// Statements follow the router.
    #[default]
    Clean,
    /// The master has been used; every statement goes there until cleared.
    MasterVisited,
}

#[derive(Debug, Default)]
struct State {
    consistency: Consistency,
    hint: Option<Hint>,
}

/// Per-session routing state. Clones share it.
#[derive(Debug, Clone, Default)]
pub struct RoutingConsistencyTracker {
    state: Arc<Mutex<State>>,
}

impl RoutingConsistencyTracker {
    /// Adjust the router's choice to the session's policy.
    ///
    /// A hint wins over everything. After that, a session that visited
    /// the master stays on it.
    pub fn resolve(&self, candidate: &str, topology: &Topology) -> String {
        let state = self.state.lock();

        match state.hint {
            Some(Hint::MasterOnly) => return topology.master().to_string(),
            Some(Hint::DataSource(ref name)) => return name.clone(),
            None => (),
        }

        match state.consistency {
            Consistency::MasterVisited => {
                if candidate != topology.master() {
                    debug!(
                        "\"{}\" overridden, master visited earlier in session",
                        candidate
                    );
                }
                topology.master().to_string()
            }
            Consistency::Clean => candidate.to_string(),
        }
    }

    /// Record where a statement is going.
    pub fn record_visit(&self, data_source: &str, topology: &Topology) {
        if topology.is_master(data_source) {
            self.state.lock().consistency = Consistency::MasterVisited;
        }
    }

    pub fn master_visited(&self) -> bool {
        self.consistency() == Consistency::MasterVisited
    }

    pub fn consistency(&self) -> Consistency {
        self.state.lock().consistency
    }

    pub fn set_hint(&self, hint: Hint) {
        self.state.lock().hint = Some(hint);
    }

    pub fn clear_hint(&self) {
        self.state.lock().hint = None;
    }

    pub fn hint(&self) -> Option<Hint> {
        self.state.lock().hint.clone()
    }

    /// Back to a clean session with no hint.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.consistency = Consistency::Clean;
        state.hint = None;
    }
}
