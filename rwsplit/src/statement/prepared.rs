//! Prepared statements.

use super::{execute_on, set_parameter, Binding, GeneratedKeys, StatementOptions};
use crate::connection::{LogicalConnection, Request};
use crate::error::Error;
use crate::router::StatementContext;
use crate::types::{Outcome, Row, Value};

/// Statement with SQL fixed at creation and parameters bound before each execution.
#[derive(Debug)]
pub struct PreparedStatement {
    connection: LogicalConnection,
    sql: String,
    options: StatementOptions,
    generated_keys: GeneratedKeys,
    parameters: Vec<Value>,
    batch: Vec<Vec<Value>>,
    binding: Binding,
    closed: bool,
}

impl PreparedStatement {
    pub(crate) fn new(
        connection: LogicalConnection,
        sql: String,
        options: StatementOptions,
        generated_keys: GeneratedKeys,
    ) -> Self {
        Self {
            connection,
            sql,
            options,
            generated_keys,
            parameters: vec![],
            batch: vec![],
            binding: Binding::Unbound,
            closed: false,
        }
    }

    /// Bind a value to the placeholder at `index`, starting at 1.
    pub fn set_parameter(&mut self, index: usize, value: impl Into<Value>) -> Result<(), Error> {
        self.check_open()?;
        set_parameter(&mut self.parameters, index, value.into())
    }

    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub async fn execute(&mut self) -> Result<Outcome, Error> {
        self.check_open()?;
        let parameters = self.parameters.clone();
        self.execute_internal(&parameters).await
    }

    pub async fn execute_query(&mut self) -> Result<Vec<Row>, Error> {
        self.execute()
            .await?
            .rows()
            .ok_or(Error::UnexpectedOutcome("rows"))
    }

    pub async fn execute_update(&mut self) -> Result<u64, Error> {
        self.execute()
            .await?
            .updated()
            .ok_or(Error::UnexpectedOutcome("an update count"))
    }

    /// Add the current parameters to the batch.
    pub fn add_batch(&mut self) -> Result<(), Error> {
        self.check_open()?;
        self.batch.push(self.parameters.clone());
        Ok(())
    }

    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Execute the statement once per batched parameter set,
    /// routing each execution separately.
    pub async fn execute_batch(&mut self) -> Result<Vec<u64>, Error> {
        self.check_open()?;
        let batch = std::mem::take(&mut self.batch);
        let mut counts = Vec::with_capacity(batch.len());

        for parameters in &batch {
            let count = self
                .execute_internal(parameters)
                .await?
                .updated()
                .ok_or(Error::UnexpectedOutcome("an update count"))?;
            counts.push(count);
        }

        Ok(counts)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn options(&self) -> &StatementOptions {
        &self.options
    }

    pub fn generated_keys(&self) -> &GeneratedKeys {
        &self.generated_keys
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn connection(&self) -> &LogicalConnection {
        &self.connection
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.parameters.clear();
        self.batch.clear();
        self.binding = Binding::Unbound;
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.connection.is_closed()
    }

    async fn execute_internal(&mut self, parameters: &[Value]) -> Result<Outcome, Error> {
        let context = StatementContext {
            sql: &self.sql,
            parameters,
            autocommit: self.connection.autocommit(),
        };
        self.binding = Binding::Unbound;
        self.binding = Binding::resolve(&self.connection, &context).await?;

        let request = Request {
            sql: &self.sql,
            parameters,
            options: &self.options,
            generated_keys: &self.generated_keys,
        };

        execute_on(&self.binding, &request).await
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }
}
