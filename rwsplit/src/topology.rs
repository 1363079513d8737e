//! Master and replica names.

use rwsplit_config::Config;

use crate::Error;

/// Names of the data sources a logical connection can bind to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    master: String,
    replicas: Vec<String>,
}

impl Topology {
    pub fn new(master: impl ToString, replicas: &[&str]) -> Self {
        Self {
            master: master.to_string(),
            replicas: replicas.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Build topology from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        config.check()?;

        let master = config
            .primary()
            .map(|ds| ds.name.clone())
            .ok_or(rwsplit_config::Error::NoPrimary)?;

        Ok(Self {
            master,
            replicas: config.replicas().map(|ds| ds.name.clone()).collect(),
        })
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    pub fn replicas(&self) -> &[String] {
        &self.replicas
    }

    pub fn is_master(&self, name: &str) -> bool {
        self.master == name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.is_master(name) || self.replicas.iter().any(|r| r == name)
    }
}
