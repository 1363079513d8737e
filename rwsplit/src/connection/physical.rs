//! Physical connections and where they come from.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::statement::{GeneratedKeys, StatementOptions};
use crate::types::{Holdability, IsolationLevel, Metadata, Outcome, Value};

/// Statement handed to a physical connection for execution.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub sql: &'a str,
    pub parameters: &'a [Value],
    pub options: &'a StatementOptions,
    pub generated_keys: &'a GeneratedKeys,
}

/// A connection to one specific database, provided by the driver.
///
/// Implementations are expected to be internally synchronized;
/// the logical connection never calls the same physical connection
/// from two tasks at once, but it does share it behind an [`Arc`].
#[async_trait]
pub trait PhysicalConnection: Send + Sync + std::fmt::Debug {
    async fn set_autocommit(&self, autocommit: bool) -> Result<(), DriverError>;

    async fn set_read_only(&self, read_only: bool) -> Result<(), DriverError>;

    async fn set_transaction_isolation(&self, level: IsolationLevel) -> Result<(), DriverError>;

    async fn set_catalog(&self, catalog: &str) -> Result<(), DriverError>;

    async fn set_holdability(&self, holdability: Holdability) -> Result<(), DriverError>;

    /// Commit the current transaction. A no-op when none is open.
    async fn commit(&self) -> Result<(), DriverError>;

    /// Roll back the current transaction. A no-op when none is open.
    async fn rollback(&self) -> Result<(), DriverError>;

    async fn savepoint(&self, name: &str) -> Result<(), DriverError>;

    async fn release_savepoint(&self, name: &str) -> Result<(), DriverError>;

    async fn rollback_to_savepoint(&self, name: &str) -> Result<(), DriverError>;

    async fn metadata(&self) -> Result<Metadata, DriverError>;

    async fn execute(&self, request: &Request<'_>) -> Result<Outcome, DriverError>;

    /// Release the connection back to its pool, or close it.
    async fn close(&self) -> Result<(), DriverError>;
}

/// Hands out physical connections by data source name.
///
/// Pooling, connect timeouts and retries are up to the implementation.
#[async_trait]
pub trait ConnectionProvider: Send + Sync + std::fmt::Debug {
    async fn connection(&self, data_source: &str)
        -> Result<Arc<dyn PhysicalConnection>, DriverError>;
}
