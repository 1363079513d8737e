//! In-memory physical connections for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rwsplit_config::{Config, DataSource as DataSourceConfig, OperationKind};

use crate::connection::{ConnectionProvider, DataSource, Operation, PhysicalConnection, Request};
use crate::error::{DriverError, Error};
use crate::router::{Router, StatementContext};
use crate::types::{ConnectionState, Holdability, IsolationLevel, Metadata, Outcome, Value};

#[derive(Debug, Default)]
struct MockState {
    settings: ConnectionState,
    applied: Vec<Operation>,
    executed: Vec<(String, Vec<Value>)>,
    fail_on: HashSet<OperationKind>,
    closed: bool,
    fail_close: bool,
    delay: Option<Duration>,
}

/// Physical connection that keeps its settings in memory.
#[derive(Debug)]
pub struct MockConnection {
    data_source: String,
    state: Mutex<MockState>,
}

impl MockConnection {
    pub fn new(data_source: &str) -> Self {
        Self {
            data_source: data_source.to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Reject operations of this kind from now on.
    pub fn fail_on(&self, kind: OperationKind) {
        self.state.lock().fail_on.insert(kind);
    }

    /// Take this long to apply every operation from now on.
    pub fn delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    pub fn fail_close(&self) {
        self.state.lock().fail_close = true;
    }

    pub fn state(&self) -> ConnectionState {
        self.state.lock().settings.clone()
    }

    /// Operations accepted so far, in order.
    pub fn applied(&self) -> Vec<Operation> {
        self.state.lock().applied.clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.state
            .lock()
            .executed
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    pub fn executed_with_parameters(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().executed.clone()
    }

    pub fn closed(&self) -> bool {
        self.state.lock().closed
    }

    async fn apply(&self, operation: Operation) -> Result<(), DriverError> {
        let delay = self.state.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();

        if state.closed {
            return Err(DriverError::new("connection closed"));
        }

        if state.fail_on.contains(&operation.kind()) {
            return Err(DriverError::with_code(
                "25001",
                format!("{} rejected by \"{}\"", operation, self.data_source),
            ));
        }

        operation.update(&mut state.settings);
        state.applied.push(operation);

        Ok(())
    }
}

#[async_trait]
impl PhysicalConnection for MockConnection {
    async fn set_autocommit(&self, autocommit: bool) -> Result<(), DriverError> {
        self.apply(Operation::SetAutocommit(autocommit)).await
    }

    async fn set_read_only(&self, read_only: bool) -> Result<(), DriverError> {
        self.apply(Operation::SetReadOnly(read_only)).await
    }

    async fn set_transaction_isolation(&self, level: IsolationLevel) -> Result<(), DriverError> {
        self.apply(Operation::SetTransactionIsolation(level)).await
    }

    async fn set_catalog(&self, catalog: &str) -> Result<(), DriverError> {
        self.apply(Operation::SetCatalog(catalog.to_string())).await
    }

    async fn set_holdability(&self, holdability: Holdability) -> Result<(), DriverError> {
        self.apply(Operation::SetHoldability(holdability)).await
    }

    async fn commit(&self) -> Result<(), DriverError> {
        self.apply(Operation::Commit).await
    }

    async fn rollback(&self) -> Result<(), DriverError> {
        self.apply(Operation::Rollback).await
    }

    async fn savepoint(&self, name: &str) -> Result<(), DriverError> {
        self.apply(Operation::Savepoint(name.to_string())).await
    }

    async fn release_savepoint(&self, name: &str) -> Result<(), DriverError> {
        self.apply(Operation::ReleaseSavepoint(name.to_string())).await
    }

    async fn rollback_to_savepoint(&self, name: &str) -> Result<(), DriverError> {
        self.apply(Operation::RollbackToSavepoint(name.to_string())).await
    }

    async fn metadata(&self) -> Result<Metadata, DriverError> {
        Ok(Metadata {
            product_name: "mock".into(),
            product_version: "1.0".into(),
            url: format!("mock://{}", self.data_source),
        })
    }

    async fn execute(&self, request: &Request<'_>) -> Result<Outcome, DriverError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(DriverError::new("connection closed"));
        }

        state
            .executed
            .push((request.sql.to_string(), request.parameters.to_vec()));

        if crate::router::read_write::is_read(request.sql) {
            Ok(Outcome::Rows(vec![vec![Value::Text(
                self.data_source.clone(),
            )]]))
        } else {
            Ok(Outcome::Updated(1))
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.closed = true;

        if state.fail_close {
            Err(DriverError::new("connection reset"))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    opened: HashMap<String, Vec<Arc<MockConnection>>>,
    unreachable: HashSet<String>,
    fail_on: HashMap<String, HashSet<OperationKind>>,
}

/// Opens a new [`MockConnection`] on every lookup and remembers it.
#[derive(Debug, Default)]
pub struct MockProvider {
    state: Mutex<ProviderState>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail to connect to the data source.
    pub fn unreachable(&self, data_source: &str) {
        self.state.lock().unreachable.insert(data_source.to_string());
    }

    pub fn reachable(&self, data_source: &str) {
        self.state.lock().unreachable.remove(data_source);
    }

    /// Connections opened to the data source from now on reject `kind`.
    pub fn fail_on(&self, data_source: &str, kind: OperationKind) {
        self.state
            .lock()
            .fail_on
            .entry(data_source.to_string())
            .or_default()
            .insert(kind);
    }

    pub fn heal(&self, data_source: &str) {
        self.state.lock().fail_on.remove(data_source);
    }

    /// How many connections were handed out for the data source.
    pub fn lookups(&self, data_source: &str) -> usize {
        self.state
            .lock()
            .opened
            .get(data_source)
            .map(|conns| conns.len())
            .unwrap_or(0)
    }

    /// Most recent connection handed out for the data source.
    pub fn last(&self, data_source: &str) -> Option<Arc<MockConnection>> {
        self.state
            .lock()
            .opened
            .get(data_source)
            .and_then(|conns| conns.last().cloned())
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn connection(
        &self,
        data_source: &str,
    ) -> Result<Arc<dyn PhysicalConnection>, DriverError> {
        let mut state = self.state.lock();

        if state.unreachable.contains(data_source) {
            return Err(DriverError::with_code(
                "08001",
                format!("\"{}\" is down", data_source),
            ));
        }

        let connection = Arc::new(MockConnection::new(data_source));
        if let Some(kinds) = state.fail_on.get(data_source) {
            for kind in kinds {
                connection.fail_on(*kind);
            }
        }

        state
            .opened
            .entry(data_source.to_string())
            .or_default()
            .push(connection.clone());

        Ok(connection)
    }
}

/// Master "m" and replicas "r1", "r2".
pub fn config() -> Config {
    Config {
        data_sources: vec![
            DataSourceConfig::primary("m"),
            DataSourceConfig::replica("r1"),
            DataSourceConfig::replica("r2"),
        ],
        ..Default::default()
    }
}

pub fn data_source(provider: &Arc<MockProvider>) -> DataSource {
    crate::logger();
    DataSource::new(&config(), provider.clone()).unwrap()
}

/// Router with routes decided up front, by SQL text.
/// Unknown statements go to the master.
#[derive(Debug, Default)]
pub struct ScriptedRouter {
    routes: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, sql: &str, data_source: &str) {
        self.routes
            .lock()
            .insert(sql.to_string(), data_source.to_string());
    }

    /// Statements the router was asked about, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Router for ScriptedRouter {
    fn resolve_target(&self, context: &StatementContext<'_>) -> Result<String, Error> {
        self.calls.lock().push(context.sql.to_string());

        Ok(self
            .routes
            .lock()
            .get(context.sql)
            .cloned()
            .unwrap_or_else(|| "m".to_string()))
    }
}

pub fn scripted_data_source(
    provider: &Arc<MockProvider>,
    router: &Arc<ScriptedRouter>,
) -> DataSource {
    crate::logger();
    DataSource::with_router(&config(), provider.clone(), router.clone()).unwrap()
}
