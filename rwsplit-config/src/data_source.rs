use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Which strategy to use for load balancing read statements across replicas.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancingStrategy {
    /// Select a replica at random (default).
    #[default]
    Random,
    /// Distribute statements in a round-robin sequence.
    RoundRobin,
}

impl FromStr for LoadBalancingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "random" => Ok(Self::Random),
            "roundrobin" => Ok(Self::RoundRobin),
            _ => Err(format!("Invalid load balancing strategy: {}", s)),
        }
    }
}

impl Display for LoadBalancingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::RoundRobin => write!(f, "round_robin"),
        }
    }
}

/// How the default router treats statements issued inside a transaction.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ReadWriteStrategy {
    /// Statements issued with autocommit off go to the primary (default).
    #[default]
    Conservative,
    /// Every statement is routed by its own read/write classification.
    Aggressive,
}

impl FromStr for ReadWriteStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(format!("Invalid read-write strategy: {}", s)),
        }
    }
}

impl Display for ReadWriteStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conservative => write!(f, "conservative"),
            Self::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// A physical database the logical connection can multiplex onto.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    /// Name the router and the connection provider use to refer to this database.
    pub name: String,
    /// Primary serves writes (and reads), replicas serve reads only.
    #[serde(default)]
    pub role: Role,
}

impl DataSource {
    pub fn primary(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            role: Role::Primary,
        }
    }

    pub fn replica(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            role: Role::Replica,
        }
    }
}

/// Role a database performs in the master/replica group.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Master database that serves writes (and reads) (default).
    #[default]
    Primary,
    /// Replica that can only serve reads.
    Replica,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Replica => write!(f, "replica"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" | "master" => Ok(Self::Primary),
            "replica" | "slave" => Ok(Self::Replica),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}
