//! Connection transfer objects.
//!
//! Whatever format the credentials were read from, the rest of the connector
//! only ever sees these records.
use crate::config::EngineKind;
use std::fmt;

/// Credentials for a MySQL server.
#[derive(Clone, PartialEq, Eq)]
pub struct MySqlConfig {
    /// Deployment label of the database
    pub database: String,
    pub host: String,
    pub port: u16,
    /// Schema to open after connecting
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Credentials for an Oracle server, addressed through its service name.
#[derive(Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub database: String,
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Engine-specific connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionConfig {
    MySql(MySqlConfig),
    Oracle(OracleConfig),
}

impl ConnectionConfig {
    pub fn engine(&self) -> EngineKind {
        match self {
            ConnectionConfig::MySql(_) => EngineKind::MySql,
            ConnectionConfig::Oracle(_) => EngineKind::Oracle,
        }
    }

    pub fn database(&self) -> &str {
        match self {
            ConnectionConfig::MySql(c) => &c.database,
            ConnectionConfig::Oracle(c) => &c.database,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            ConnectionConfig::MySql(c) => &c.host,
            ConnectionConfig::Oracle(c) => &c.host,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            ConnectionConfig::MySql(c) => c.port,
            ConnectionConfig::Oracle(c) => c.port,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ConnectionConfig::MySql(c) => &c.name,
            ConnectionConfig::Oracle(c) => &c.name,
        }
    }

    pub fn user(&self) -> &str {
        match self {
            ConnectionConfig::MySql(c) => &c.user,
            ConnectionConfig::Oracle(c) => &c.user,
        }
    }

    pub fn password(&self) -> &str {
        match self {
            ConnectionConfig::MySql(c) => &c.password,
            ConnectionConfig::Oracle(c) => &c.password,
        }
    }

    pub fn service_name(&self) -> Option<&str> {
        match self {
            ConnectionConfig::MySql(_) => None,
            ConnectionConfig::Oracle(c) => Some(&c.service_name),
        }
    }
}

impl fmt::Debug for MySqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConfig")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleConfig")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service_name", &self.service_name)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
