/// Connection Management Module
///
/// A [`Connection`] binds one [`ConnectionConfig`] to one driver binding and
/// walks the `Unconnected → Connected → Closed` lifecycle. Every operation
/// reports its outcome as a [`QueryResult`]; driver errors and driver panics
/// are classified, never propagated.

use super::classify::{panic_message, DriverFault};
use super::drivers::{self, Driver};
use super::query::{Cardinality, CursorShape, Query, QueryKind, QueryResult, RowSet};
use crate::config_source::ConnectionConfig;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Rows fetched by a `Many` read unless configured otherwise
pub const DEFAULT_FETCH_BATCH: usize = 100;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Unconnected,
    Connected,
    /// Terminal
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Unconnected => "unconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A single engine connection.
///
/// Movable across threads but not shareable. Dropping the connection
/// disconnects it.
pub struct Connection {
    id: Uuid,
    config: ConnectionConfig,
    driver: Box<dyn Driver>,
    state: ConnectionState,
    cursor: Option<CursorShape>,
    /// Set by `set_cursor`; pins the shape over each query's own
    cursor_pinned: bool,
    fetch_batch: usize,
}

impl Connection {
    /// Creates an unconnected handle using the configured engine's binding.
    pub fn new(config: ConnectionConfig) -> Self {
        let driver = drivers::for_engine(config.engine());
        Self::with_driver(config, driver)
    }

    /// Creates an unconnected handle using a caller-supplied binding.
    pub fn with_driver(config: ConnectionConfig, driver: Box<dyn Driver>) -> Self {
        Connection {
            id: Uuid::new_v4(),
            config,
            driver,
            state: ConnectionState::Unconnected,
            cursor: None,
            cursor_pinned: false,
            fetch_batch: DEFAULT_FETCH_BATCH,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Shape of the open cursor, if one has been opened
    pub fn cursor(&self) -> Option<CursorShape> {
        self.cursor
    }

    pub fn fetch_batch(&self) -> usize {
        self.fetch_batch
    }

    /// Sets the row count fetched by `Many` reads. Zero is raised to one.
    pub fn set_fetch_batch(&mut self, batch: usize) {
        self.fetch_batch = batch.max(1);
    }

    /// Opens the engine connection.
    pub fn connect(&mut self) -> QueryResult {
        match self.state {
            ConnectionState::Connected => return QueryResult::success("Already connected"),
            ConnectionState::Closed => {
                return self.failed("connect", DriverFault::interface("Connection is closed"))
            }
            ConnectionState::Unconnected => {}
        }

        match self.guarded(|driver, config| driver.connect(config)) {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                info!(
                    connection = %self.id,
                    engine = %self.config.engine(),
                    driver = self.driver.name(),
                    host = self.config.host(),
                    "Connected"
                );
                QueryResult::success(format!("Connected to {}", self.driver.name()))
            }
            Err(fault) => self.failed("connect", fault),
        }
    }

    /// Selects the row shape for subsequent reads, overriding the shape each
    /// query asks for until the connection is closed.
    pub fn set_cursor(&mut self, shape: CursorShape) -> QueryResult {
        if let Some(result) = self.require_connected("set_cursor") {
            return result;
        }
        self.cursor = Some(shape);
        self.cursor_pinned = true;
        debug!(connection = %self.id, ?shape, "Cursor opened");
        QueryResult::success("Cursor opened")
    }

    /// Runs a query as-is.
    ///
    /// Reads fetch according to the query's cardinality and return rows in
    /// the cursor's shape. Writes report `affected_rows` and are committed
    /// when `auto_commit` is set.
    pub fn execute(&mut self, query: &Query, auto_commit: bool) -> QueryResult {
        let kind = match query.validate() {
            Ok(kind) => kind,
            Err(reason) => {
                warn!(connection = %self.id, "Rejected query: {}", reason);
                return QueryResult::invalid_query(reason);
            }
        };
        if let Some(result) = self.require_connected("execute") {
            return result;
        }

        match kind {
            QueryKind::Read => self.read(query),
            QueryKind::Write => self.write(query, auto_commit),
        }
    }

    fn read(&mut self, query: &Query) -> QueryResult {
        let shape = match self.cursor {
            Some(shape) if self.cursor_pinned => shape,
            _ => query.cursor_shape,
        };
        self.cursor = Some(shape);
        let limit = match query.cardinality {
            Some(Cardinality::One) => Some(1),
            Some(Cardinality::Many) => Some(self.fetch_batch),
            Some(Cardinality::All) | None => None,
        };

        let text = query.text.as_str();
        match self.guarded(|driver, _| driver.query(text, limit)) {
            Ok(fetched) => {
                let rows = RowSet::from_fetched(fetched, shape);
                debug!(connection = %self.id, rows = rows.len(), "Read complete");
                QueryResult::success(format!("{} row(s) fetched", rows.len())).with_rows(rows)
            }
            Err(fault) => self.failed("execute", fault),
        }
    }

    fn write(&mut self, query: &Query, auto_commit: bool) -> QueryResult {
        let text = query.text.as_str();
        let affected = match self.guarded(|driver, _| driver.execute(text)) {
            Ok(affected) => affected,
            Err(fault) => return self.failed("execute", fault),
        };
        debug!(connection = %self.id, affected, auto_commit, "Write complete");

        let result = QueryResult::success(format!("{} row(s) affected", affected))
            .with_extra("affected_rows", affected);
        if !auto_commit {
            return result;
        }
        match self.guarded(|driver, _| driver.commit()) {
            Ok(()) => result.with_extra("committed", true),
            Err(fault) => self.failed("commit", fault),
        }
    }

    /// Commits pending writes.
    pub fn commit(&mut self) -> QueryResult {
        if let Some(result) = self.require_connected("commit") {
            return result;
        }
        match self.guarded(|driver, _| driver.commit()) {
            Ok(()) => {
                debug!(connection = %self.id, "Committed");
                QueryResult::success("Committed")
            }
            Err(fault) => self.failed("commit", fault),
        }
    }

    /// Closes the cursor and the engine connection.
    ///
    /// Safe from any state and safe to repeat. Close errors are logged and
    /// the connection ends up `Closed` regardless.
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.cursor = None;
        self.cursor_pinned = false;
        if let Err(fault) = self.guarded(|driver, _| driver.close()) {
            warn!(connection = %self.id, "Error closing connection: {}", fault);
        }
        if self.state == ConnectionState::Connected {
            info!(connection = %self.id, "Disconnected");
        }
        self.state = ConnectionState::Closed;
    }

    fn require_connected(&self, operation: &str) -> Option<QueryResult> {
        if self.is_connected() {
            return None;
        }
        let fault = DriverFault::interface(format!("Cannot {} while {}", operation, self.state));
        Some(self.failed(operation, fault))
    }

    /// Runs a driver call, turning a panic into an unclassified fault.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut dyn Driver, &ConnectionConfig) -> Result<T, DriverFault>,
    ) -> Result<T, DriverFault> {
        let driver = self.driver.as_mut();
        let config = &self.config;
        match panic::catch_unwind(AssertUnwindSafe(|| op(driver, config))) {
            Ok(result) => result,
            Err(payload) => Err(DriverFault::unclassified(panic_message(payload.as_ref()))),
        }
    }

    fn failed(&self, operation: &str, fault: DriverFault) -> QueryResult {
        warn!(
            connection = %self.id,
            operation,
            kind = %fault.kind,
            "{}",
            fault.message
        );
        fault.into()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("driver", &self.driver.name())
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("cursor_pinned", &self.cursor_pinned)
            .field("fetch_batch", &self.fetch_batch)
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
