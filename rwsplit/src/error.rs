//! Logical connection errors.

use thiserror::Error;

use crate::connection::Operation;

/// Error reported by a physical connection's driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    /// SQLSTATE, if the driver has one.
    pub code: Option<String>,
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl ToString) -> Self {
        Self {
            code: None,
            message: message.to_string(),
        }
    }

    pub fn with_code(code: impl ToString, message: impl ToString) -> Self {
        Self {
            code: Some(code.to_string()),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("can't connect to \"{data_source}\": {source}")]
    Connectivity {
        data_source: String,
        #[source]
        source: DriverError,
    },

    #[error("replaying \"{operation}\" on \"{data_source}\" failed: {source}")]
    StateSync {
        data_source: String,
        operation: Operation,
        #[source]
        source: DriverError,
    },

    #[error("connection is closed")]
    Closed,

    #[error("\"{operation}\" failed on \"{data_source}\": {source}")]
    Mutation {
        data_source: String,
        operation: Operation,
        #[source]
        source: DriverError,
    },

    #[error("\"{operation}\" applied to {applied:?} but failed on \"{failed}\": {source}")]
    PartialMutation {
        operation: Operation,
        applied: Vec<String>,
        failed: String,
        #[source]
        source: DriverError,
    },

    #[error("data source \"{0}\" is not configured")]
    UnknownDataSource(String),

    #[error("closing {} connection(s) failed: {}", .0.len(), display_close(.0))]
    Close(Vec<(String, DriverError)>),

    #[error("{0}")]
    Driver(#[from] DriverError),

    #[error("expected {0}")]
    UnexpectedOutcome(&'static str),

    #[error("parameter index {0} is out of range, parameters start at 1")]
    ParameterIndex(usize),

    #[error("{0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("config: {0}")]
    Config(#[from] rwsplit_config::Error),
}

fn display_close(errors: &[(String, DriverError)]) -> String {
    errors
        .iter()
        .map(|(name, err)| format!("\"{}\": {}", name, err))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// The error left some bound connections in a different
    /// state than others.
    pub fn diverged(&self) -> bool {
        matches!(self, Error::PartialMutation { .. })
    }
}
