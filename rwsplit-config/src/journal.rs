use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Connection-level operation that can be recorded and replayed
/// onto physical connections opened later in the session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Autocommit,
    ReadOnly,
    TransactionIsolation,
    Catalog,
    Holdability,
    Commit,
    Rollback,
    Savepoint,
    ReleaseSavepoint,
    RollbackToSavepoint,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        Self::Autocommit,
        Self::ReadOnly,
        Self::TransactionIsolation,
        Self::Catalog,
        Self::Holdability,
        Self::Commit,
        Self::Rollback,
        Self::Savepoint,
        Self::ReleaseSavepoint,
        Self::RollbackToSavepoint,
    ];
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Autocommit => "autocommit",
            Self::ReadOnly => "read_only",
            Self::TransactionIsolation => "transaction_isolation",
            Self::Catalog => "catalog",
            Self::Holdability => "holdability",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
            Self::Savepoint => "savepoint",
            Self::ReleaseSavepoint => "release_savepoint",
            Self::RollbackToSavepoint => "rollback_to_savepoint",
        };

        write!(f, "{}", display)
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string() == normalized)
            .ok_or_else(|| format!("Invalid operation: {}", s))
    }
}

/// Which operations the logical connection records for replay.
///
/// Operations missing from this list are still applied to every
/// physical connection bound at the time of the call, but connections
/// bound afterwards won't see them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Journal {
    #[serde(default = "Journal::default_operations")]
    pub operations: Vec<OperationKind>,
}

impl Journal {
    /// Session settings and transaction boundaries. Savepoints only make
    /// sense on the connection that opened the transaction, so they're left out.
    fn default_operations() -> Vec<OperationKind> {
        use OperationKind::*;
        vec![
            Autocommit,
            ReadOnly,
            TransactionIsolation,
            Catalog,
            Holdability,
            Commit,
            Rollback,
        ]
    }

    /// The operation is recorded for replay.
    pub fn journaled(&self, kind: OperationKind) -> bool {
        self.operations.contains(&kind)
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            operations: Self::default_operations(),
        }
    }
}
