//! Logical connection over one master and any number of replicas.
//!
//! Physical connections are opened lazily, the first time a statement is
//! routed to them. Connection-level settings issued before that are
//! journaled and replayed onto each connection as it gets bound, so every
//! physical connection a [`LogicalConnection`] uses ends up in the same state.

pub mod connection;
pub mod error;
pub mod router;
pub mod session;
pub mod statement;
pub mod topology;
pub mod types;

#[cfg(test)]
pub mod test;

pub use rwsplit_config as config;

pub use connection::{
    ConnectionProvider, DataSource, Journal, LogicalConnection, Operation, PhysicalConnection,
    Request,
};
pub use error::{DriverError, Error};
pub use router::{ReadWriteRouter, Router, StatementContext};
pub use session::{Consistency, Hint, RoutingConsistencyTracker, Session};
pub use statement::{
    Binding, Concurrency, GeneratedKeys, PreparedStatement, ResultSetType, Statement,
    StatementOptions,
};
pub use topology::Topology;
pub use types::{ConnectionState, Holdability, IsolationLevel, Metadata, Outcome, Row, Value};

use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Setup the logger, so `info!`, `debug!`
/// and other macros actually output something.
///
/// Using try_init and ignoring errors to allow
/// for use in tests (setting up multiple times).
pub fn logger() {
    let format = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_file(false);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .try_init();
}
