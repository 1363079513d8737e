//! Entry point applications acquire logical connections from.

use std::path::Path;
use std::sync::Arc;

use rwsplit_config::{Config, Journal as JournalConfig};
use tracing::info;

use super::{ConnectionProvider, Journal, LogicalConnection};
use crate::error::Error;
use crate::router::{ReadWriteRouter, Router};
use crate::session::Session;
use crate::topology::Topology;

/// Master/replica data source.
#[derive(Debug, Clone)]
pub struct DataSource {
    topology: Arc<Topology>,
    provider: Arc<dyn ConnectionProvider>,
    router: Arc<dyn Router>,
    journal: JournalConfig,
}

impl DataSource {
    /// Create data source routing with the default read/write router.
    pub fn new(config: &Config, provider: Arc<dyn ConnectionProvider>) -> Result<Self, Error> {
        let topology = Arc::new(Topology::from_config(config)?);
        let router = Arc::new(ReadWriteRouter::new(&config.general, topology.clone()));

        Ok(Self::from_parts(
            topology,
            provider,
            router,
            config.journal.clone(),
        ))
    }

    /// Create data source with a custom router.
    pub fn with_router(
        config: &Config,
        provider: Arc<dyn ConnectionProvider>,
        router: Arc<dyn Router>,
    ) -> Result<Self, Error> {
        let topology = Arc::new(Topology::from_config(config)?);
        Ok(Self::from_parts(
            topology,
            provider,
            router,
            config.journal.clone(),
        ))
    }

    /// Load configuration from a TOML file.
    pub fn load(
        path: impl AsRef<Path>,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Result<Self, Error> {
        let config = Config::load(path)?;
        Self::new(&config, provider)
    }

    fn from_parts(
        topology: Arc<Topology>,
        provider: Arc<dyn ConnectionProvider>,
        router: Arc<dyn Router>,
        journal: JournalConfig,
    ) -> Self {
        info!(
            "data source ready, master \"{}\", {} replica(s)",
            topology.master(),
            topology.replicas().len()
        );

        Self {
            topology,
            provider,
            router,
            journal,
        }
    }

    /// Acquire a logical connection for the session. Nothing is
    /// connected until a statement needs it.
    pub fn connection(&self, session: &Session) -> LogicalConnection {
        LogicalConnection::new(
            session,
            self.topology.clone(),
            self.provider.clone(),
            self.router.clone(),
            Journal::new(self.journal.clone()),
        )
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}
