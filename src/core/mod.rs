/// Core Module for the connector
///
/// This module contains the pieces every other layer builds on: the
/// construction-time error type, the connection state machine, the query and
/// result value objects, fault classification and the engine driver bindings.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{ConnectorError, Result};
