//! Oracle binding over the `oracle` crate (ODPI-C).
//!
//! Connects with an EZConnect string built from host, port and service
//! name. The crate keeps autocommit off by default.

use super::{bytes_value, Driver, FetchedRows};
use crate::config_source::ConnectionConfig;
use crate::core::db::classify::{DriverFault, FaultKind};
use oracle::sql_type::OracleType;
use oracle::{Connection, SqlValue};
use serde_json::Value;
use tracing::debug;

#[derive(Default)]
pub struct OracleDriver {
    conn: Option<Connection>,
}

impl OracleDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&self) -> Result<&Connection, DriverFault> {
        self.conn
            .as_ref()
            .ok_or_else(|| DriverFault::interface("Oracle connection is not open"))
    }
}

/// `//host:port/service`, falling back to the database name when no
/// service name is configured.
pub fn connect_string(config: &ConnectionConfig) -> String {
    format!(
        "//{}:{}/{}",
        config.host(),
        config.port(),
        config.service_name().unwrap_or(config.name())
    )
}

impl Driver for OracleDriver {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn connect(&mut self, config: &ConnectionConfig) -> Result<(), DriverFault> {
        let target = connect_string(config);
        let conn = Connection::connect(config.user(), config.password(), &target)
            .map_err(map_error)?;
        debug!(target = %target, "Opened Oracle session");
        self.conn = Some(conn);
        Ok(())
    }

    fn query(&mut self, text: &str, limit: Option<usize>) -> Result<FetchedRows, DriverFault> {
        let conn = self.conn()?;
        let mut result_set = conn.query(text, &[]).map_err(map_error)?;
        let columns: Vec<String> = result_set
            .column_info()
            .iter()
            .map(|info| info.name().to_string())
            .collect();

        let mut rows = Vec::new();
        while limit.map_or(true, |limit| rows.len() < limit) {
            let Some(row) = result_set.next() else {
                break;
            };
            let row = row.map_err(map_error)?;
            let values = row
                .sql_values()
                .iter()
                .map(to_json)
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(values);
        }
        Ok(FetchedRows { columns, rows })
    }

    fn execute(&mut self, text: &str) -> Result<u64, DriverFault> {
        let conn = self.conn()?;
        let stmt = conn.execute(text, &[]).map_err(map_error)?;
        stmt.row_count().map_err(map_error)
    }

    fn commit(&mut self) -> Result<(), DriverFault> {
        self.conn()?.commit().map_err(map_error)
    }

    fn close(&mut self) -> Result<(), DriverFault> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(map_error)?;
        }
        Ok(())
    }
}

fn to_json(value: &SqlValue) -> Result<Value, DriverFault> {
    if value.is_null().map_err(map_error)? {
        return Ok(Value::Null);
    }
    let converted = match value.oracle_type().map_err(map_error)? {
        OracleType::Number(_, _)
        | OracleType::Int64
        | OracleType::UInt64
        | OracleType::Float(_)
        | OracleType::BinaryFloat
        | OracleType::BinaryDouble => match value.get::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => {
                let f = value.get::<f64>().map_err(map_error)?;
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        },
        OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB => {
            bytes_value(&value.get::<Vec<u8>>().map_err(map_error)?)
        }
        _ => Value::String(value.get::<String>().map_err(map_error)?),
    };
    Ok(converted)
}

/// Fault kind for an `ORA-` error number.
fn kind_for_ora(code: i32) -> FaultKind {
    match code {
        1 | 1400 | 1407 | 2290 | 2291 | 2292 => FaultKind::Integrity,
        1401 | 1438 | 1476 | 1722 | 1830 | 1843 | 1858 | 12899 => FaultKind::Data,
        900..=999 | 1031 | 6550 => FaultKind::Programming,
        600 | 7445 => FaultKind::Internal,
        3001 => FaultKind::NotSupported,
        _ => FaultKind::Operational,
    }
}

/// Maps an `oracle` crate error onto the fault taxonomy.
pub fn map_error(err: oracle::Error) -> DriverFault {
    use oracle::Error;

    let message = err.to_string();
    match &err {
        Error::OciError(db) => {
            DriverFault::new(kind_for_ora(db.code()), db.message()).with_code(db.code())
        }
        Error::DpiError(db) => DriverFault::new(FaultKind::Interface, db.message()),
        Error::NullValue
        | Error::NoDataFound
        | Error::OutOfRange(_)
        | Error::ParseError(_)
        | Error::InvalidTypeConversion(..) => DriverFault::new(FaultKind::Data, message),
        Error::InvalidBindIndex(_)
        | Error::InvalidBindName(_)
        | Error::InvalidColumnIndex(_)
        | Error::InvalidColumnName(_) => DriverFault::new(FaultKind::Programming, message),
        Error::InvalidOperation(_) => DriverFault::new(FaultKind::Interface, message),
        Error::InternalError(_) => DriverFault::new(FaultKind::Internal, message),
        #[allow(unreachable_patterns)]
        _ => DriverFault::new(FaultKind::Driver, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_source::{ConnectionConfig, OracleConfig};

    fn config(service_name: &str) -> ConnectionConfig {
        ConnectionConfig::Oracle(OracleConfig {
            database: "ORCL".to_string(),
            host: "db.internal".to_string(),
            port: 1521,
            service_name: service_name.to_string(),
            name: "orcl".to_string(),
            user: "scott".to_string(),
            password: "tiger".to_string(),
        })
    }

    #[test]
    fn test_connect_string() {
        assert_eq!(connect_string(&config("XEPDB1")), "//db.internal:1521/XEPDB1");
    }

    #[test]
    fn test_ora_codes() {
        assert_eq!(kind_for_ora(1), FaultKind::Integrity);
        assert_eq!(kind_for_ora(1476), FaultKind::Data);
        assert_eq!(kind_for_ora(942), FaultKind::Programming);
        assert_eq!(kind_for_ora(3113), FaultKind::Operational);
        assert_eq!(kind_for_ora(600), FaultKind::Internal);
        assert_eq!(kind_for_ora(3001), FaultKind::NotSupported);
        assert_eq!(kind_for_ora(20001), FaultKind::Operational);
    }

    #[test]
    fn test_unopened_driver_faults() {
        let mut driver = OracleDriver::new();
        assert_eq!(driver.commit().unwrap_err().kind, FaultKind::Interface);
        assert!(driver.close().is_ok());
    }
}
