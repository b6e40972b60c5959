//! Engine driver bindings.
//!
//! A binding adapts one vendor driver crate to the [`Driver`] trait and owns
//! the single function that maps that crate's errors onto [`FaultKind`].
//! Bindings block the calling thread; none of them spawns threads.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "oracle")]
pub mod oracle_driver;
pub mod sqlite;

use super::classify::DriverFault;
use crate::config::EngineKind;
use crate::config_source::ConnectionConfig;
use serde_json::Value;

/// Rows fetched by a read, before shaping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchedRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Blocking connection to a single engine.
pub trait Driver: Send {
    /// Engine name for logs and messages
    fn name(&self) -> &'static str;

    /// Opens the engine connection. The binding starts outside autocommit so
    /// writes stay pending until [`Driver::commit`].
    fn connect(&mut self, config: &ConnectionConfig) -> Result<(), DriverFault>;

    /// Runs a row-returning statement, fetching at most `limit` rows
    /// (`None` fetches everything). Unfetched rows are discarded.
    fn query(&mut self, text: &str, limit: Option<usize>) -> Result<FetchedRows, DriverFault>;

    /// Runs a statement that returns no rows and reports the affected row count.
    fn execute(&mut self, text: &str) -> Result<u64, DriverFault>;

    fn commit(&mut self) -> Result<(), DriverFault>;

    /// Closes the engine connection. Closing twice is a no-op.
    fn close(&mut self) -> Result<(), DriverFault>;
}

/// Creates the binding for an engine.
///
/// Engines whose binding was not compiled in get a stand-in that fails every
/// operation with a `NotSupported` fault.
pub fn for_engine(engine: EngineKind) -> Box<dyn Driver> {
    match engine {
        #[cfg(feature = "mysql")]
        EngineKind::MySql => Box::new(mysql::MySqlDriver::new()),

        #[cfg(feature = "oracle")]
        EngineKind::Oracle => Box::new(oracle_driver::OracleDriver::new()),

        // Fallback for when feature not compiled
        #[allow(unreachable_patterns)]
        _ => Box::new(UnavailableDriver { engine }),
    }
}

/// Binary column value: text when it is valid UTF-8, otherwise the raw bytes.
pub(crate) fn bytes_value(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// Stand-in for an engine whose binding is not compiled in.
#[derive(Debug)]
pub struct UnavailableDriver {
    engine: EngineKind,
}

impl UnavailableDriver {
    fn fault(&self) -> DriverFault {
        DriverFault::not_supported(format!(
            "{} driver not available (enable the '{}' feature)",
            self.engine,
            self.engine.name().to_ascii_lowercase()
        ))
    }
}

impl Driver for UnavailableDriver {
    fn name(&self) -> &'static str {
        self.engine.name()
    }

    fn connect(&mut self, _config: &ConnectionConfig) -> Result<(), DriverFault> {
        Err(self.fault())
    }

    fn query(&mut self, _text: &str, _limit: Option<usize>) -> Result<FetchedRows, DriverFault> {
        Err(self.fault())
    }

    fn execute(&mut self, _text: &str) -> Result<u64, DriverFault> {
        Err(self.fault())
    }

    fn commit(&mut self) -> Result<(), DriverFault> {
        Err(self.fault())
    }

    fn close(&mut self) -> Result<(), DriverFault> {
        Ok(())
    }
}
