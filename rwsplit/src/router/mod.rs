//! Per-statement routing.

use crate::error::Error;
use crate::types::Value;

pub mod read_write;

pub use read_write::ReadWriteRouter;

/// What the router gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct StatementContext<'a> {
    pub sql: &'a str,
    pub parameters: &'a [Value],
    /// Autocommit setting of the logical connection issuing the statement.
    pub autocommit: bool,
}

/// Picks the data source a statement should run on.
///
/// Stateless: session consistency is applied on top of whatever it returns.
pub trait Router: Send + Sync + std::fmt::Debug {
    fn resolve_target(&self, context: &StatementContext<'_>) -> Result<String, Error>;
}
