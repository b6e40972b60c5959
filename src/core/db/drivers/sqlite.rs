//! Embedded SQLite binding.
//!
//! Opens the file named by the configuration's `name` (`":memory:"` for an
//! in-memory database). Not selectable through `EngineKind`; callers attach
//! it explicitly with `Connection::with_driver`.

use super::{bytes_value, Driver, FetchedRows};
use crate::config_source::ConnectionConfig;
use crate::core::db::classify::{DriverFault, FaultKind};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default)]
pub struct SqliteDriver {
    conn: Option<Connection>,
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&self) -> Result<&Connection, DriverFault> {
        self.conn
            .as_ref()
            .ok_or_else(|| DriverFault::interface("SQLite connection is not open"))
    }
}

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn connect(&mut self, config: &ConnectionConfig) -> Result<(), DriverFault> {
        let conn = Connection::open(config.name()).map_err(map_error)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(map_error)?;
        debug!(path = config.name(), "Opened SQLite database");
        self.conn = Some(conn);
        Ok(())
    }

    fn query(&mut self, text: &str, limit: Option<usize>) -> Result<FetchedRows, DriverFault> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(text).map_err(map_error)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = stmt.column_count();

        let mut rows = stmt.query([]).map_err(map_error)?;
        let mut fetched = Vec::new();
        while limit.map_or(true, |limit| fetched.len() < limit) {
            let Some(row) = rows.next().map_err(map_error)? else {
                break;
            };
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(to_json(row.get_ref(i).map_err(map_error)?));
            }
            fetched.push(values);
        }

        Ok(FetchedRows {
            columns,
            rows: fetched,
        })
    }

    fn execute(&mut self, text: &str) -> Result<u64, DriverFault> {
        let conn = self.conn()?;
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN").map_err(map_error)?;
        }
        let changed = conn.execute(text, []).map_err(map_error)?;
        Ok(changed as u64)
    }

    fn commit(&mut self) -> Result<(), DriverFault> {
        let conn = self.conn()?;
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT").map_err(map_error)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverFault> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| map_error(e))?;
        }
        Ok(())
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => bytes_value(b),
    }
}

/// Maps a rusqlite error onto the fault taxonomy.
pub fn map_error(err: rusqlite::Error) -> DriverFault {
    use rusqlite::ffi::ErrorCode;
    use rusqlite::Error;

    let message = match &err {
        Error::SqliteFailure(_, Some(detail)) => detail.clone(),
        other => other.to_string(),
    };

    match &err {
        Error::SqliteFailure(failure, _) => {
            let kind = match failure.code {
                ErrorCode::ConstraintViolation => FaultKind::Integrity,
                ErrorCode::TypeMismatch | ErrorCode::TooBig | ErrorCode::ParameterOutOfRange => {
                    FaultKind::Data
                }
                ErrorCode::InternalMalfunction => FaultKind::Internal,
                ErrorCode::Unknown
                | ErrorCode::SchemaChanged
                | ErrorCode::AuthorizationForStatementDenied => FaultKind::Programming,
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::OutOfMemory
                | ErrorCode::ReadOnly
                | ErrorCode::OperationInterrupted
                | ErrorCode::OperationAborted
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotFound
                | ErrorCode::DiskFull
                | ErrorCode::CannotOpen
                | ErrorCode::FileLockingProtocolFailed
                | ErrorCode::PermissionDenied
                | ErrorCode::NotADatabase => FaultKind::Operational,
                ErrorCode::ApiMisuse => FaultKind::Interface,
                ErrorCode::NoLargeFileSupport => FaultKind::NotSupported,
                #[allow(unreachable_patterns)]
                _ => FaultKind::Driver,
            };
            DriverFault::new(kind, message).with_code(failure.extended_code)
        }
        Error::InvalidColumnType(..)
        | Error::FromSqlConversionFailure(..)
        | Error::IntegralValueOutOfRange(..)
        | Error::Utf8Error(_)
        | Error::QueryReturnedNoRows => DriverFault::new(FaultKind::Data, message),
        Error::ExecuteReturnedResults
        | Error::InvalidQuery
        | Error::MultipleStatement
        | Error::InvalidParameterCount(..)
        | Error::InvalidParameterName(_)
        | Error::InvalidColumnIndex(_)
        | Error::InvalidColumnName(_) => DriverFault::new(FaultKind::Programming, message),
        Error::InvalidPath(_) | Error::NulError(_) | Error::SqliteSingleThreadedMode => {
            DriverFault::new(FaultKind::Interface, message)
        }
        _ => DriverFault::new(FaultKind::Driver, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sqlite_config;
    use serde_json::json;

    fn open() -> SqliteDriver {
        let mut driver = SqliteDriver::new();
        driver.connect(&sqlite_config(":memory:")).unwrap();
        driver
            .conn()
            .unwrap()
            .execute_batch(
                "
                CREATE TABLE test (
                    id INTEGER PRIMARY KEY,
                    name TEXT,
                    value REAL,
                    data BLOB
                );
                INSERT INTO test (name, value, data) VALUES ('Alice', 123.5, X'48656C6C6F');
                INSERT INTO test (name, value, data) VALUES ('Bob', 678.25, X'FF00');
                INSERT INTO test (name, value, data) VALUES (NULL, NULL, NULL);
            ",
            )
            .unwrap();
        driver
    }

    #[test]
    fn test_query_all_and_limited() {
        let mut driver = open();
        let all = driver.query("SELECT id, name, value FROM test ORDER BY id", None).unwrap();
        assert_eq!(all.columns, vec!["id", "name", "value"]);
        assert_eq!(all.rows.len(), 3);
        assert_eq!(all.rows[0], vec![json!(1), json!("Alice"), json!(123.5)]);
        assert_eq!(all.rows[2], vec![json!(3), Value::Null, Value::Null]);

        let two = driver.query("SELECT id FROM test ORDER BY id", Some(2)).unwrap();
        assert_eq!(two.rows, vec![vec![json!(1)], vec![json!(2)]]);
    }

    #[test]
    fn test_blob_handling() {
        let mut driver = open();
        let rows = driver.query("SELECT data FROM test ORDER BY id", Some(2)).unwrap().rows;
        assert_eq!(rows[0][0], json!("Hello"));
        assert_eq!(rows[1][0], json!([255, 0]));
    }

    #[test]
    fn test_execute_and_commit() {
        let mut driver = open();
        let changed = driver.execute("UPDATE test SET value = 1 WHERE name IS NOT NULL").unwrap();
        assert_eq!(changed, 2);
        assert!(!driver.conn().unwrap().is_autocommit());

        driver.commit().unwrap();
        assert!(driver.conn().unwrap().is_autocommit());
    }

    #[test]
    fn test_error_mapping() {
        let mut driver = open();

        let fault = driver.query("SELECT * FROM nonexistent_table", None).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Programming);
        assert!(fault.message.contains("no such table"));

        let fault = driver.execute("INSERT INTO test (id, name) VALUES (1, 'dup')").unwrap_err();
        assert_eq!(fault.kind, FaultKind::Integrity);
        assert!(fault.code.is_some());

        let fault = driver.execute("SELECT 1").unwrap_err();
        assert_eq!(fault.kind, FaultKind::Programming);
    }

    #[test]
    fn test_open_failure_is_operational() {
        let mut driver = SqliteDriver::new();
        let fault = driver
            .connect(&sqlite_config("/nonexistent/path/database.db"))
            .unwrap_err();
        assert_eq!(fault.kind, FaultKind::Operational);
    }

    #[test]
    fn test_close_is_idempotent_and_guards_use() {
        let mut driver = open();
        driver.close().unwrap();
        driver.close().unwrap();
        let fault = driver.query("SELECT 1", None).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Interface);
    }
}
