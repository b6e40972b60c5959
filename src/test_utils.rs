/// # Test Utilities Module
///
/// Shared fixtures for unit tests:
/// - Seeded SQLite databases in temporary directories
/// - Connections bound to the embedded SQLite binding
/// - A scripted driver that records calls and injects faults or panics

use crate::config_source::{ConnectionConfig, MySqlConfig};
use crate::core::db::classify::DriverFault;
use crate::core::db::connection::Connection;
use crate::core::db::drivers::sqlite::SqliteDriver;
use crate::core::db::drivers::{Driver, FetchedRows};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Rows in the seeded `people` table
pub const SEEDED_ROWS: usize = 120;

/// Config whose `name` is the SQLite path.
pub fn sqlite_config(path: &str) -> ConnectionConfig {
    ConnectionConfig::MySql(MySqlConfig {
        database: "test".to_string(),
        host: "localhost".to_string(),
        port: 3306,
        name: path.to_string(),
        user: "tester".to_string(),
        password: String::new(),
    })
}

/// Unconnected handle on the SQLite database at `path`.
pub fn sqlite_connection(path: &Path) -> Connection {
    Connection::with_driver(
        sqlite_config(&path.to_string_lossy()),
        Box::new(SqliteDriver::new()),
    )
}

/// Creates a database file holding a `people` table of [`SEEDED_ROWS`] rows.
///
/// The directory is removed when the returned guard drops.
pub fn seeded_database() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("people.db");
    let conn = rusqlite::Connection::open(&path).expect("Failed to create test database");
    conn.execute_batch(&format!(
        "
        CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            score REAL
        );
        WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < {})
        INSERT INTO people (id, name, email, score)
            SELECT n, 'person-' || n, 'person' || n || '@example.com', n * 1.5 FROM seq;
        ",
        SEEDED_ROWS
    ))
    .expect("Failed to seed test database");
    (dir, path)
}

/// Driver double that records every call.
#[derive(Default)]
pub struct ScriptedDriver {
    log: Arc<Mutex<Vec<&'static str>>>,
    faults: HashMap<&'static str, DriverFault>,
    panics: Vec<&'static str>,
}

impl ScriptedDriver {
    /// Any config works; the scripted driver never reads it.
    pub fn config() -> ConnectionConfig {
        sqlite_config("scripted")
    }

    pub fn failing_on(mut self, operation: &'static str, fault: DriverFault) -> Self {
        self.faults.insert(operation, fault);
        self
    }

    pub fn panicking_on(mut self, operation: &'static str) -> Self {
        self.panics.push(operation);
        self
    }

    /// Shared call log, readable after the driver moves into a connection
    pub fn log(&self) -> Arc<Mutex<Vec<&'static str>>> {
        Arc::clone(&self.log)
    }

    fn step(&self, operation: &'static str) -> Result<(), DriverFault> {
        self.log.lock().unwrap().push(operation);
        if self.panics.contains(&operation) {
            panic!("scripted panic in {}", operation);
        }
        match self.faults.get(operation) {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }
}

impl Driver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn connect(&mut self, _config: &ConnectionConfig) -> Result<(), DriverFault> {
        self.step("connect")
    }

    fn query(&mut self, _text: &str, limit: Option<usize>) -> Result<FetchedRows, DriverFault> {
        self.step("query")?;
        let rows: Vec<_> = (1..=3).map(|n| vec![json!(n)]).collect();
        Ok(FetchedRows {
            columns: vec!["n".to_string()],
            rows: rows.into_iter().take(limit.unwrap_or(usize::MAX)).collect(),
        })
    }

    fn execute(&mut self, _text: &str) -> Result<u64, DriverFault> {
        self.step("execute")?;
        Ok(1)
    }

    fn commit(&mut self) -> Result<(), DriverFault> {
        self.step("commit")
    }

    fn close(&mut self) -> Result<(), DriverFault> {
        self.step("close")
    }
}
