//! Values, results and connection-level settings.

use std::fmt::Display;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

/// What happens to open cursors when a transaction commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Holdability {
    #[default]
    HoldCursorsOverCommit,
    CloseCursorsAtCommit,
}

impl Display for Holdability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HoldCursorsOverCommit => write!(f, "hold cursors over commit"),
            Self::CloseCursorsAtCommit => write!(f, "close cursors at commit"),
        }
    }
}

/// Connection-level settings every physical connection
/// bound to the same logical connection must agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub autocommit: bool,
    pub read_only: bool,
    pub isolation: IsolationLevel,
    pub catalog: Option<String>,
    pub holdability: Holdability,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            autocommit: true,
            read_only: false,
            isolation: IsolationLevel::default(),
            catalog: None,
            holdability: Holdability::default(),
        }
    }
}

/// Statement parameter or column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

pub type Row = Vec<Value>;

/// What a statement execution returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Row>),
    Updated(u64),
}

impl Outcome {
    pub fn rows(self) -> Option<Vec<Row>> {
        match self {
            Outcome::Rows(rows) => Some(rows),
            Outcome::Updated(_) => None,
        }
    }

    pub fn updated(&self) -> Option<u64> {
        match self {
            Outcome::Updated(count) => Some(*count),
            Outcome::Rows(_) => None,
        }
    }
}

/// Database metadata, as reported by a physical connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub product_name: String,
    pub product_version: String,
    pub url: String,
}
