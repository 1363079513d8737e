//! Logical statements.
//!
//! Statements hold on to the logical connection and the options they were
//! created with. Nothing is bound until they execute; every execution,
//! including each entry of a batch, is routed on its own.

use crate::connection::{LogicalConnection, Request};
use crate::error::Error;
use crate::router::StatementContext;
use crate::types::{Holdability, Outcome, Row, Value};

pub mod binding;
pub mod prepared;

pub use binding::Binding;
pub use prepared::PreparedStatement;

#[cfg(test)]
mod test;

/// Scrolling behavior of result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultSetType {
    #[default]
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
}

/// Whether result sets can be updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    #[default]
    ReadOnly,
    Updatable,
}

/// Result set options a statement was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatementOptions {
    pub result_set_type: ResultSetType,
    pub concurrency: Concurrency,
    /// Connection's holdability if not set.
    pub holdability: Option<Holdability>,
}

impl StatementOptions {
    pub fn new(result_set_type: ResultSetType, concurrency: Concurrency) -> Self {
        Self {
            result_set_type,
            concurrency,
            holdability: None,
        }
    }

    pub fn with_holdability(mut self, holdability: Holdability) -> Self {
        self.holdability = Some(holdability);
        self
    }
}

/// Auto-generated keys the driver should return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeneratedKeys {
    #[default]
    None,
    /// Whatever the driver considers generated.
    Returned,
    ColumnIndexes(Vec<usize>),
    ColumnNames(Vec<String>),
}

/// Statement executing plain SQL text.
#[derive(Debug)]
pub struct Statement {
    connection: LogicalConnection,
    options: StatementOptions,
    binding: Binding,
    batch: Vec<String>,
    closed: bool,
}

impl Statement {
    pub(crate) fn new(connection: LogicalConnection, options: StatementOptions) -> Self {
        Self {
            connection,
            options,
            binding: Binding::Unbound,
            batch: vec![],
            closed: false,
        }
    }

    /// Execute any statement.
    pub async fn execute(&mut self, sql: &str) -> Result<Outcome, Error> {
        self.check_open()?;
        self.execute_internal(sql).await
    }

    /// Execute a statement that returns rows.
    pub async fn execute_query(&mut self, sql: &str) -> Result<Vec<Row>, Error> {
        self.execute(sql)
            .await?
            .rows()
            .ok_or(Error::UnexpectedOutcome("rows"))
    }

    /// Execute a statement that returns an update count.
    pub async fn execute_update(&mut self, sql: &str) -> Result<u64, Error> {
        self.execute(sql)
            .await?
            .updated()
            .ok_or(Error::UnexpectedOutcome("an update count"))
    }

    pub fn add_batch(&mut self, sql: impl ToString) -> Result<(), Error> {
        self.check_open()?;
        self.batch.push(sql.to_string());
        Ok(())
    }

    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Execute every batched statement in order, each routed separately.
    /// The batch is emptied whether it succeeds or not.
    pub async fn execute_batch(&mut self) -> Result<Vec<u64>, Error> {
        self.check_open()?;
        let batch = std::mem::take(&mut self.batch);
        let mut counts = Vec::with_capacity(batch.len());

        for sql in &batch {
            let count = self
                .execute_internal(sql)
                .await?
                .updated()
                .ok_or(Error::UnexpectedOutcome("an update count"))?;
            counts.push(count);
        }

        Ok(counts)
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn options(&self) -> &StatementOptions {
        &self.options
    }

    pub fn connection(&self) -> &LogicalConnection {
        &self.connection
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.batch.clear();
        self.binding = Binding::Unbound;
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.connection.is_closed()
    }

    async fn execute_internal(&mut self, sql: &str) -> Result<Outcome, Error> {
        let context = StatementContext {
            sql,
            parameters: &[],
            autocommit: self.connection.autocommit(),
        };
        self.binding = Binding::Unbound;
        self.binding = Binding::resolve(&self.connection, &context).await?;

        let request = Request {
            sql,
            parameters: &[],
            options: &self.options,
            generated_keys: &GeneratedKeys::None,
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

async fn execute_on(binding: &Binding, request: &Request<'_>) -> Result<Outcome, Error> {
    match binding.connection() {
        Some(connection) => Ok(connection.execute(request).await?),
        None => Err(Error::Closed),
    }
}

/// Parameters, 1-based like the statement placeholders.
pub(crate) fn set_parameter(
    parameters: &mut Vec<Value>,
    index: usize,
    value: Value,
) -> Result<(), Error> {
    if index == 0 {
        return Err(Error::ParameterIndex(index));
    }

    if parameters.len() < index {
        parameters.resize(index, Value::Null);
    }
    parameters[index - 1] = value;

    Ok(())
}
