use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use super::data_source::{DataSource, Role};
use super::error::Error;
use super::general::General;
use super::journal::Journal;

/// Configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// General configuration.
    #[serde(default)]
    pub general: General,

    /// Master and replicas.
    #[serde(default)]
    pub data_sources: Vec<DataSource>,

    /// Operations replayed onto lazily bound connections.
    #[serde(default)]
    pub journal: Journal,
}

impl Config {
    /// Load configuration from disk or use defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let config = if let Ok(source) = read_to_string(path) {
            let config = source.parse::<Config>()?;
            info!("loaded \"{}\"", path.display());
            config
        } else {
            warn!(
                "\"{}\" doesn't exist, loading defaults instead",
                path.display()
            );
            Config::default()
        };

        Ok(config)
    }

    /// Make sure the data sources describe exactly one master
    /// and that names are unique.
    pub fn check(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();

        for data_source in &self.data_sources {
            if data_source.name.is_empty() {
                return Err(Error::EmptyName);
            }
            if !seen.insert(data_source.name.as_str()) {
                return Err(Error::DuplicateDataSource(data_source.name.clone()));
            }
        }

        let primaries = self
            .data_sources
            .iter()
            .filter(|ds| ds.role == Role::Primary)
            .map(|ds| ds.name.clone())
            .collect::<Vec<_>>();

        match primaries.len() {
            0 => Err(Error::NoPrimary),
            1 => Ok(()),
            _ => Err(Error::MultiplePrimaries(primaries)),
        }
    }

    /// Name of the master data source, if configured.
    pub fn primary(&self) -> Option<&DataSource> {
        self.data_sources
            .iter()
            .find(|ds| ds.role == Role::Primary)
    }

    /// Replica data sources, in configuration order.
    pub fn replicas(&self) -> impl Iterator<Item = &DataSource> {
        self.data_sources
            .iter()
            .filter(|ds| ds.role == Role::Replica)
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        toml::from_str(source).map_err(|err| Error::config(source, err))
    }
}
