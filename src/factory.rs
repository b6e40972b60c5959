//! Connector factory: resolves the engine, loads its connection configuration
//! once and hands out independent connections.
use crate::config::{ConnectorSettings, EngineKind};
use crate::config_source::{ConfigSourceFactory, ConnectionConfig};
use crate::core::db::{Connection, Driver, Query};
use crate::core::Result;
use tracing::info;

/// Produces connections for one engine and one cached configuration.
///
/// Read-only after construction, so it can be shared across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorFactory {
    engine: EngineKind,
    config: ConnectionConfig,
}

impl ConnectorFactory {
    /// Builds a factory from the `DC_*` environment variables.
    pub fn select() -> Result<Self> {
        Self::from_settings(&ConnectorSettings::from_env()?)
    }

    /// Builds a factory from explicit settings without touching the
    /// environment.
    pub fn from_settings(settings: &ConnectorSettings) -> Result<Self> {
        let sources = ConfigSourceFactory::from_settings(settings);
        let config = sources.load_connection_config(settings.engine)?;
        info!(
            engine = %settings.engine,
            format = %settings.format,
            path = %sources.config_path().display(),
            "Connector factory ready"
        );
        Ok(Self::from_config(config))
    }

    /// Wraps an already extracted configuration.
    pub fn from_config(config: ConnectionConfig) -> Self {
        ConnectorFactory {
            engine: config.engine(),
            config,
        }
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// New, unconnected connection using the engine's driver binding.
    pub fn get_connection(&self) -> Connection {
        Connection::new(self.config.clone())
    }

    /// New, unconnected connection using a caller-supplied driver binding.
    pub fn get_connection_with(&self, driver: Box<dyn Driver>) -> Connection {
        Connection::with_driver(self.config.clone(), driver)
    }

    /// Empty query for the caller to fill in.
    pub fn get_query_template(&self) -> Query {
        Query::default()
    }
}
