//! Connection-level calls, recorded in the order they were issued.

use std::fmt::Display;

use rwsplit_config::{Journal as JournalConfig, OperationKind};
use tracing::debug;

use super::PhysicalConnection;
use crate::error::{DriverError, Error};
use crate::types::{ConnectionState, Holdability, IsolationLevel};

/// A mutating call issued on the logical connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SetAutocommit(bool),
    SetReadOnly(bool),
    SetTransactionIsolation(IsolationLevel),
    SetCatalog(String),
    SetHoldability(Holdability),
    Commit,
    Rollback,
    Savepoint(String),
    ReleaseSavepoint(String),
    RollbackToSavepoint(String),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::SetAutocommit(_) => OperationKind::Autocommit,
            Self::SetReadOnly(_) => OperationKind::ReadOnly,
            Self::SetTransactionIsolation(_) => OperationKind::TransactionIsolation,
            Self::SetCatalog(_) => OperationKind::Catalog,
            Self::SetHoldability(_) => OperationKind::Holdability,
            Self::Commit => OperationKind::Commit,
            Self::Rollback => OperationKind::Rollback,
            Self::Savepoint(_) => OperationKind::Savepoint,
            Self::ReleaseSavepoint(_) => OperationKind::ReleaseSavepoint,
            Self::RollbackToSavepoint(_) => OperationKind::RollbackToSavepoint,
        }
    }

    /// Issue the call on a physical connection.
    pub async fn apply(&self, connection: &dyn PhysicalConnection) -> Result<(), DriverError> {
        match self {
            Self::SetAutocommit(autocommit) => connection.set_autocommit(*autocommit).await,
            Self::SetReadOnly(read_only) => connection.set_read_only(*read_only).await,
            Self::SetTransactionIsolation(level) => {
                connection.set_transaction_isolation(*level).await
            }
            Self::SetCatalog(catalog) => connection.set_catalog(catalog).await,
            Self::SetHoldability(holdability) => connection.set_holdability(*holdability).await,
            Self::Commit => connection.commit().await,
            Self::Rollback => connection.rollback().await,
            Self::Savepoint(name) => connection.savepoint(name).await,
            Self::ReleaseSavepoint(name) => connection.release_savepoint(name).await,
            Self::RollbackToSavepoint(name) => connection.rollback_to_savepoint(name).await,
        }
    }

    /// Reflect the call in the logical connection's settings.
    pub fn update(&self, state: &mut ConnectionState) {
        match self {
            Self::SetAutocommit(autocommit) => state.autocommit = *autocommit,
            Self::SetReadOnly(read_only) => state.read_only = *read_only,
            Self::SetTransactionIsolation(level) => state.isolation = *level,
            Self::SetCatalog(catalog) => state.catalog = Some(catalog.clone()),
            Self::SetHoldability(holdability) => state.holdability = *holdability,
            Self::Commit
            | Self::Rollback
            | Self::Savepoint(_)
            | Self::ReleaseSavepoint(_)
            | Self::RollbackToSavepoint(_) => (),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetAutocommit(autocommit) => write!(f, "autocommit = {}", autocommit),
            Self::SetReadOnly(read_only) => write!(f, "read_only = {}", read_only),
            Self::SetTransactionIsolation(level) => write!(f, "isolation = {}", level),
            Self::SetCatalog(catalog) => write!(f, "catalog = {}", catalog),
            Self::SetHoldability(holdability) => write!(f, "holdability = {}", holdability),
            Self::Commit => write!(f, "commit"),
            Self::Rollback => write!(f, "rollback"),
            Self::Savepoint(name) => write!(f, "savepoint {}", name),
            Self::ReleaseSavepoint(name) => write!(f, "release savepoint {}", name),
            Self::RollbackToSavepoint(name) => write!(f, "rollback to savepoint {}", name),
        }
    }
}

/// Append-only log of operations issued on a logical connection.
#[derive(Debug, Default)]
pub struct Journal {
    config: JournalConfig,
    entries: Vec<Operation>,
}

impl Journal {
    pub fn new(config: JournalConfig) -> Self {
        Self {
            config,
            entries: vec![],
        }
    }

    /// Record the operation if its kind is journaled.
    pub fn record(&mut self, operation: Operation) -> bool {
        if self.config.journaled(operation.kind()) {
            self.entries.push(operation);
            true
        } else {
            false
        }
    }

    /// Apply every recorded operation, in order, to a freshly
    /// bound connection. Stops at the first failure; the caller must
    /// not use the connection afterwards.
    pub async fn replay_onto(
        &self,
        data_source: &str,
        connection: &dyn PhysicalConnection,
    ) -> Result<(), Error> {
        for operation in &self.entries {
            debug!("replaying \"{}\" [{}]", operation, data_source);

            operation
                .apply(connection)
                .await
                .map_err(|source| Error::StateSync {
                    data_source: data_source.to_string(),
                    operation: operation.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    pub fn entries(&self) -> &[Operation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything. Only done when the logical connection closes.
    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }
}
