//! Late binding of statements to physical connections.

use std::sync::Arc;

use tracing::debug;

use crate::connection::{LogicalConnection, PhysicalConnection};
use crate::error::Error;
use crate::router::StatementContext;

/// The physical connection a statement last executed on.
#[derive(Debug, Clone, Default)]
pub enum Binding {
    #[default]
    Unbound,
    Bound {
        data_source: String,
        connection: Arc<dyn PhysicalConnection>,
    },
}

impl Binding {
    /// Route the statement and bind the connection it needs.
    ///
    /// The router picks a candidate and the session's consistency policy
    /// gets the final word. The visit is recorded before the bind, so it
    /// sticks even if the bind fails, unless the connection is closed.
    pub(crate) async fn resolve(
        connection: &LogicalConnection,
        context: &StatementContext<'_>,
    ) -> Result<Binding, Error> {
        let topology = connection.topology();
        let tracker = connection.session().tracker();

        let candidate = connection.router().resolve_target(context)?;
        let data_source = tracker.resolve(&candidate, topology);

        debug!(
            "\"{}\" routed to \"{}\" [{}]",
            context.sql,
            data_source,
            connection.session().id()
        );

        let physical = connection.bind_routed(&data_source).await?;

        Ok(Binding::Bound {
            data_source,
            connection: physical,
        })
    }

    pub fn data_source(&self) -> Option<&str> {
        match self {
            Binding::Bound { data_source, .. } => Some(data_source),
            Binding::Unbound => None,
        }
    }

    pub fn connection(&self) -> Option<&Arc<dyn PhysicalConnection>> {
        match self {
            Binding::Bound { connection, .. } => Some(connection),
            Binding::Unbound => None,
        }
    }

    pub fn bound(&self) -> bool {
        matches!(self, Binding::Bound { .. })
    }
}
