//! Logical connection multiplexed over master and replica connections.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Error;
use crate::router::Router;
use crate::session::Session;
use crate::statement::{GeneratedKeys, PreparedStatement, Statement, StatementOptions};
use crate::topology::Topology;
use crate::types::{ConnectionState, Holdability, IsolationLevel, Metadata};

pub mod data_source;
pub mod journal;
pub mod physical;

pub use data_source::DataSource;
pub use journal::{Journal, Operation};
pub use physical::{ConnectionProvider, PhysicalConnection, Request};


/// Physical connections bound so far and the calls
/// they need to have seen.
#[derive(Debug)]
struct Bound {
    connections: IndexMap<String, Arc<dyn PhysicalConnection>>,
    journal: Journal,
}

#[derive(Debug)]
struct Inner {
    session: Session,
    topology: Arc<Topology>,
    provider: Arc<dyn ConnectionProvider>,
    router: Arc<dyn Router>,
    bound: Mutex<Bound>,
    state: parking_lot::Mutex<ConnectionState>,
    closed: AtomicBool,
}

/// The session's routing state is only cleared by [`LogicalConnection::close`].
/// Statements hold clones of the connection, so the last clone can go away long
/// after other connections in the same session started relying on it.
impl Drop for Inner {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Relaxed) {
            warn!(
                "logical connection dropped without being closed [{}]",
                self.session.id()
            );
        }
    }
}

/// Application-facing connection.
///
/// Cheap to clone; clones refer to the same connection, so one of them
/// can be closed from another task to cancel the session.
#[derive(Debug, Clone)]
pub struct LogicalConnection {
    inner: Arc<Inner>,
}

impl LogicalConnection {
    pub(crate) fn new(
        session: &Session,
        topology: Arc<Topology>,
        provider: Arc<dyn ConnectionProvider>,
        router: Arc<dyn Router>,
        journal: Journal,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session: session.clone(),
                topology,
                provider,
                router,
                bound: Mutex::new(Bound {
                    connections: IndexMap::new(),
                    journal,
                }),
                state: parking_lot::Mutex::new(ConnectionState::default()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Get the physical connection for the data source, opening it
    /// and bringing it up to date with this connection's settings
    /// if it's not bound yet.
    pub async fn bind(&self, data_source: &str) -> Result<Arc<dyn PhysicalConnection>, Error> {
        self.check_open()?;
        let mut bound = self.inner.bound.lock().await;
        // Could've been closed while we waited for the lock.
        self.check_open()?;

        self.bind_locked(&mut bound, data_source).await
    }

    /// Bind the connection a statement was routed to and record the visit
    /// with the session. The visit is recorded under the bind lock, so it
    /// can't land after [`close`](Self::close) cleared the session.
    pub(crate) async fn bind_routed(
        &self,
        data_source: &str,
    ) -> Result<Arc<dyn PhysicalConnection>, Error> {
        self.check_open()?;
        let mut bound = self.inner.bound.lock().await;
        self.check_open()?;

        self.inner
            .session
            .tracker()
            .record_visit(data_source, &self.inner.topology);

        self.bind_locked(&mut bound, data_source).await
    }

    async fn bind_locked(
        &self,
        bound: &mut Bound,
        data_source: &str,
    ) -> Result<Arc<dyn PhysicalConnection>, Error> {
        if let Some(connection) = bound.connections.get(data_source) {
            return Ok(connection.clone());
        }

        if !self.inner.topology.contains(data_source) {
            return Err(Error::UnknownDataSource(data_source.to_string()));
        }

        debug!(
            "binding \"{}\", replaying {} operation(s) [{}]",
            data_source,
            bound.journal.len(),
            self.inner.session.id()
        );

        let connection = self
            .inner
            .provider
            .connection(data_source)
            .await
            .map_err(|source| Error::Connectivity {
                data_source: data_source.to_string(),
                source,
            })?;

        if let Err(err) = bound
            .journal
            .replay_onto(data_source, connection.as_ref())
            .await
        {
            warn!("{} [{}]", err, self.inner.session.id());

            if let Err(close) = connection.close().await {
                warn!(
                    "discarding \"{}\" failed: {} [{}]",
                    data_source,
                    close,
                    self.inner.session.id()
                );
            }

            return Err(err);
        }

        bound
            .connections
            .insert(data_source.to_string(), connection.clone());

        Ok(connection)
    }

    /// Apply the operation to every bound connection and record it.
    ///
    /// Either all bound connections accept it and it's journaled,
    /// or the first rejection is returned and the journal is left alone.
    /// Once started, the broadcast runs to completion even if the
    /// caller stops waiting for it.
    async fn mutate(&self, operation: Operation) -> Result<(), Error> {
        self.check_open()?;

        let connection = self.clone();
        tokio::spawn(async move { connection.broadcast(operation).await }).await?
    }

    async fn broadcast(&self, operation: Operation) -> Result<(), Error> {
        let mut bound = self.inner.bound.lock().await;
        self.check_open()?;

        let mut applied = Vec::with_capacity(bound.connections.len());

        for (data_source, connection) in &bound.connections {
            if let Err(source) = operation.apply(connection.as_ref()).await {
                let err = if applied.is_empty() {
                    Error::Mutation {
                        data_source: data_source.clone(),
                        operation,
                        source,
                    }
                } else {
                    Error::PartialMutation {
                        operation,
                        applied,
                        failed: data_source.clone(),
                        source,
                    }
                };
                warn!("{} [{}]", err, self.inner.session.id());
                return Err(err);
            }

            applied.push(data_source.clone());
        }

        operation.update(&mut self.inner.state.lock());
        bound.journal.record(operation);

        Ok(())
    }

    pub async fn set_autocommit(&self, autocommit: bool) -> Result<(), Error> {
        self.mutate(Operation::SetAutocommit(autocommit)).await
    }

    pub async fn set_read_only(&self, read_only: bool) -> Result<(), Error> {
        self.mutate(Operation::SetReadOnly(read_only)).await
    }

    pub async fn set_transaction_isolation(&self, level: IsolationLevel) -> Result<(), Error> {
        self.mutate(Operation::SetTransactionIsolation(level)).await
    }

    pub async fn set_catalog(&self, catalog: impl ToString) -> Result<(), Error> {
        self.mutate(Operation::SetCatalog(catalog.to_string())).await
    }

    pub async fn set_holdability(&self, holdability: Holdability) -> Result<(), Error> {
        self.mutate(Operation::SetHoldability(holdability)).await
    }

    pub async fn commit(&self) -> Result<(), Error> {
        self.mutate(Operation::Commit).await
    }

    pub async fn rollback(&self) -> Result<(), Error> {
        self.mutate(Operation::Rollback).await
    }

    pub async fn savepoint(&self, name: impl ToString) -> Result<(), Error> {
        self.mutate(Operation::Savepoint(name.to_string())).await
    }

    pub async fn release_savepoint(&self, name: impl ToString) -> Result<(), Error> {
        self.mutate(Operation::ReleaseSavepoint(name.to_string())).await
    }

    pub async fn rollback_to_savepoint(&self, name: impl ToString) -> Result<(), Error> {
        self.mutate(Operation::RollbackToSavepoint(name.to_string())).await
    }

    /// Metadata from any bound connection, they're all equivalent.
    /// Binds the master if nothing is bound yet.
    pub async fn metadata(&self) -> Result<Metadata, Error> {
        self.check_open()?;
        let mut bound = self.inner.bound.lock().await;
        self.check_open()?;

        let connection = match bound.connections.values().next() {
            Some(connection) => connection.clone(),
            None => {
                let master = self.inner.topology.master().to_string();
                self.bind_locked(&mut bound, &master).await?
            }
        };

        Ok(connection.metadata().await?)
    }

    pub fn create_statement(&self) -> Result<Statement, Error> {
        self.create_statement_with(StatementOptions::default())
    }

    pub fn create_statement_with(&self, options: StatementOptions) -> Result<Statement, Error> {
        self.check_open()?;
        Ok(Statement::new(self.clone(), options))
    }

    pub fn prepare_statement(&self, sql: impl ToString) -> Result<PreparedStatement, Error> {
        self.prepare_statement_with(sql, StatementOptions::default())
    }

    pub fn prepare_statement_with(
        &self,
        sql: impl ToString,
        options: StatementOptions,
    ) -> Result<PreparedStatement, Error> {
        self.check_open()?;
        Ok(PreparedStatement::new(
            self.clone(),
            sql.to_string(),
            options,
            GeneratedKeys::None,
        ))
    }

    /// Prepare a statement that reports generated keys.
    pub fn prepare_statement_with_keys(
        &self,
        sql: impl ToString,
        generated_keys: GeneratedKeys,
    ) -> Result<PreparedStatement, Error> {
        self.check_open()?;
        Ok(PreparedStatement::new(
            self.clone(),
            sql.to_string(),
            StatementOptions::default(),
            generated_keys,
        ))
    }

    /// Close the connection: forget the session's routing state and
    /// release every bound physical connection. Safe to call more than once.
    ///
    /// Waits for in-flight binds and mutations to finish first.
    ///
    /// Every connection is closed even if some fail; the failures are
    /// returned together.
    pub async fn close(&self) -> Result<(), Error> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut bound = self.inner.bound.lock().await;
        self.inner.session.tracker().clear();
        let connections = std::mem::take(&mut bound.connections);
        bound.journal.clear();
        drop(bound);

        let mut errors = vec![];

        for (data_source, connection) in connections {
            if let Err(err) = connection.close().await {
                warn!(
                    "closing \"{}\" failed: {} [{}]",
                    data_source,
                    err,
                    self.inner.session.id()
                );
                errors.push((data_source, err));
            }
        }

        debug!("logical connection closed [{}]", self.inner.session.id());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Close(errors))
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn autocommit(&self) -> bool {
        self.inner.state.lock().autocommit
    }

    pub fn read_only(&self) -> bool {
        self.inner.state.lock().read_only
    }

    pub fn transaction_isolation(&self) -> IsolationLevel {
        self.inner.state.lock().isolation
    }

    pub fn catalog(&self) -> Option<String> {
        self.inner.state.lock().catalog.clone()
    }

    pub fn holdability(&self) -> Holdability {
        self.inner.state.lock().holdability
    }

    /// Snapshot of connection-level settings.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().clone()
    }

    /// Names of the data sources bound so far.
    pub async fn bound_data_sources(&self) -> Vec<String> {
        self.inner
            .bound
            .lock()
            .await
            .connections
            .keys()
            .cloned()
            .collect()
    }

    /// Number of operations waiting to be replayed onto new connections.
    pub async fn journal_len(&self) -> usize {
        self.inner.bound.lock().await.journal.len()
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn topology(&self) -> &Topology {
        &self.inner.topology
    }

    pub(crate) fn router(&self) -> &dyn Router {
        self.inner.router.as_ref()
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }
}
