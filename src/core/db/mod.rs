/// Database Module
///
/// The runtime half of the connector, organized into focused submodules:
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): the per-config state machine
/// - **Query Values** (`query.rs`): `Query` in, `QueryResult` out
/// - **Fault Classification** (`classify.rs`): driver errors to `(code, message)`
/// - **Driver Bindings** (`drivers/`): one adapter per engine driver crate
///
/// ## Error Handling
///
/// Nothing in this module returns `Err` to the caller at runtime. Failures are
/// reported through `QueryResult::code`, zero meaning success.
pub mod classify;
pub mod connection;
pub mod drivers;
pub mod query;

pub use classify::{classify, DriverFault, FaultKind, UNCLASSIFIED_CODE};
pub use connection::{Connection, ConnectionState, DEFAULT_FETCH_BATCH};
pub use drivers::{Driver, FetchedRows};
pub use query::*;
