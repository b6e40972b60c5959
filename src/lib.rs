//! Pluggable database connector.
//!
//! The engine (MySQL or Oracle) and the configuration file format (JSON,
//! YAML, INI, XML or plain text) are selected once, from the `DC_*`
//! environment variables or a settings file. A [`ConnectorFactory`] then
//! hands out [`Connection`]s that run caller-supplied SQL and report every
//! outcome as a [`QueryResult`].
//!
//! ```no_run
//! use dbconnector::{Cardinality, ConnectorFactory, Query};
//!
//! let factory = ConnectorFactory::select()?;
//! let mut conn = factory.get_connection();
//! if conn.connect().is_success() {
//!     let result = conn.execute(&Query::read("SELECT 1", Cardinality::One), false);
//!     println!("{} {}", result.code, result.message);
//! }
//! # Ok::<(), dbconnector::ConnectorError>(())
//! ```

// Core infrastructure modules
pub mod core;

// Selection and configuration
pub mod config;
pub mod config_source;
pub mod factory;

#[cfg(test)]
mod test_utils;

pub use config::{ConfigFormat, ConnectorSettings, EngineKind};
pub use config_source::{ConfigSourceFactory, ConfigSourceReader, ConnectionConfig};
pub use core::db::{
    Cardinality, Connection, ConnectionState, CursorShape, DriverFault, FaultKind, Query,
    QueryKind, QueryResult, RowSet,
};
pub use core::{ConnectorError, Result};
pub use factory::ConnectorFactory;
