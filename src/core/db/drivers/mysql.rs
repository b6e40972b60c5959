//! MySQL binding over `mysql_async`.
//!
//! The driver owns a current-thread tokio runtime and blocks on it for every
//! call, so callers stay synchronous. Sessions start with autocommit off.

use super::{bytes_value, Driver, FetchedRows};
use crate::config_source::ConnectionConfig;
use crate::core::db::classify::{DriverFault, FaultKind};
use mysql_async::prelude::*;
use mysql_async::{Conn, OptsBuilder};
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

#[derive(Default)]
pub struct MySqlDriver {
    runtime: Option<Runtime>,
    conn: Option<Conn>,
}

impl MySqlDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&mut self) -> Result<(&Runtime, &mut Conn), DriverFault> {
        match (self.runtime.as_ref(), self.conn.as_mut()) {
            (Some(runtime), Some(conn)) => Ok((runtime, conn)),
            _ => Err(DriverFault::interface("MySQL connection is not open")),
        }
    }
}

impl Driver for MySqlDriver {
    fn name(&self) -> &'static str {
        "MySql"
    }

    fn connect(&mut self, config: &ConnectionConfig) -> Result<(), DriverFault> {
        if self.runtime.is_none() {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| {
                    DriverFault::new(
                        FaultKind::Operational,
                        format!("Failed to start MySQL runtime: {}", e),
                    )
                })?;
            self.runtime = Some(runtime);
        }

        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host())
            .tcp_port(config.port())
            .user(Some(config.user()))
            .pass(Some(config.password()))
            .db_name(Some(config.name()))
            .init(vec!["SET autocommit=0"]);

        let Some(runtime) = self.runtime.as_ref() else {
            return Err(DriverFault::interface("MySQL runtime is not available"));
        };
        let conn = runtime.block_on(Conn::new(opts)).map_err(map_error)?;
        debug!(host = config.host(), port = config.port(), "Opened MySQL session");
        self.conn = Some(conn);
        Ok(())
    }

    fn query(&mut self, text: &str, limit: Option<usize>) -> Result<FetchedRows, DriverFault> {
        let (runtime, conn) = self.session()?;
        runtime.block_on(async move {
            let mut result = conn.query_iter(text).await.map_err(map_error)?;
            let columns: Vec<String> = result
                .columns_ref()
                .iter()
                .map(|c| c.name_str().to_string())
                .collect();

            let mut rows = Vec::new();
            while limit.map_or(true, |limit| rows.len() < limit) {
                let Some(row) = result.next().await.map_err(map_error)? else {
                    break;
                };
                let values: Vec<Value> = (0..row.len())
                    .map(|i| row.as_ref(i).map_or(Value::Null, to_json))
                    .collect();
                rows.push(values);
            }

            // Unfetched rows must be drained before the session is reused
            result.drop_result().await.map_err(map_error)?;
            Ok::<_, DriverFault>(FetchedRows { columns, rows })
        })
    }

    fn execute(&mut self, text: &str) -> Result<u64, DriverFault> {
        let (runtime, conn) = self.session()?;
        runtime.block_on(async move {
            conn.query_drop(text).await.map_err(map_error)?;
            Ok(conn.affected_rows())
        })
    }

    fn commit(&mut self) -> Result<(), DriverFault> {
        let (runtime, conn) = self.session()?;
        runtime
            .block_on(conn.query_drop("COMMIT"))
            .map_err(map_error)
    }

    fn close(&mut self) -> Result<(), DriverFault> {
        if let (Some(runtime), Some(conn)) = (self.runtime.as_ref(), self.conn.take()) {
            runtime.block_on(conn.disconnect()).map_err(map_error)?;
        }
        Ok(())
    }
}

fn to_json(value: &mysql_async::Value) -> Value {
    use mysql_async::Value as My;

    match value {
        My::NULL => Value::Null,
        My::Bytes(b) => bytes_value(b),
        My::Int(n) => Value::from(*n),
        My::UInt(n) => Value::from(*n),
        My::Float(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        My::Double(d) => serde_json::Number::from_f64(*d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        My::Date(year, month, day, hour, min, sec, micro) => {
            let Some(date) =
                chrono::NaiveDate::from_ymd_opt(i32::from(*year), u32::from(*month), u32::from(*day))
            else {
                return Value::Null;
            };
            if *hour == 0 && *min == 0 && *sec == 0 && *micro == 0 {
                return Value::String(date.format("%Y-%m-%d").to_string());
            }
            date.and_hms_micro_opt(u32::from(*hour), u32::from(*min), u32::from(*sec), *micro)
                .map_or(Value::Null, |dt| {
                    Value::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
                })
        }
        My::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = days * 24 + u32::from(*hours);
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds);
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::String(text)
        }
    }
}

/// Fault kind for a server error, by SQLSTATE class.
fn kind_for_sqlstate(sqlstate: &str) -> FaultKind {
    match sqlstate.get(..2).unwrap_or_default() {
        "23" => FaultKind::Integrity,
        "22" => FaultKind::Data,
        "42" | "21" | "3D" | "3F" => FaultKind::Programming,
        "0A" => FaultKind::NotSupported,
        "XX" => FaultKind::Internal,
        _ => FaultKind::Operational,
    }
}

/// Maps a `mysql_async` error onto the fault taxonomy.
pub fn map_error(err: mysql_async::Error) -> DriverFault {
    use mysql_async::Error;

    match err {
        Error::Server(server) => {
            let kind = kind_for_sqlstate(&server.state);
            DriverFault::new(kind, server.message)
                .with_code(i32::from(server.code))
                .with_sqlstate(server.state)
        }
        Error::Io(e) => DriverFault::new(FaultKind::Operational, e.to_string()),
        Error::Driver(e) => DriverFault::new(FaultKind::Interface, e.to_string()),
        Error::Url(e) => DriverFault::new(FaultKind::Interface, e.to_string()),
        #[allow(unreachable_patterns)]
        other => DriverFault::new(FaultKind::Driver, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql_async::Value as My;
    use serde_json::json;

    #[test]
    fn test_sqlstate_classes() {
        assert_eq!(kind_for_sqlstate("23000"), FaultKind::Integrity);
        assert_eq!(kind_for_sqlstate("22003"), FaultKind::Data);
        assert_eq!(kind_for_sqlstate("42000"), FaultKind::Programming);
        assert_eq!(kind_for_sqlstate("42S02"), FaultKind::Programming);
        assert_eq!(kind_for_sqlstate("0A000"), FaultKind::NotSupported);
        assert_eq!(kind_for_sqlstate("08S01"), FaultKind::Operational);
        assert_eq!(kind_for_sqlstate("40001"), FaultKind::Operational);
        assert_eq!(kind_for_sqlstate("HY000"), FaultKind::Operational);
        assert_eq!(kind_for_sqlstate(""), FaultKind::Operational);
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(to_json(&My::NULL), Value::Null);
        assert_eq!(to_json(&My::Bytes(b"hello".to_vec())), json!("hello"));
        assert_eq!(to_json(&My::Int(-4)), json!(-4));
        assert_eq!(to_json(&My::UInt(7)), json!(7));
        assert_eq!(to_json(&My::Double(1.5)), json!(1.5));
        assert_eq!(to_json(&My::Date(2024, 2, 29, 0, 0, 0, 0)), json!("2024-02-29"));
        assert_eq!(
            to_json(&My::Date(2024, 2, 29, 13, 5, 9, 0)),
            json!("2024-02-29 13:05:09")
        );
        assert_eq!(to_json(&My::Date(2023, 2, 30, 0, 0, 0, 0)), Value::Null);
        assert_eq!(to_json(&My::Time(true, 1, 2, 3, 4, 0)), json!("-26:03:04"));
    }

    #[test]
    fn test_closed_session_faults() {
        let mut driver = MySqlDriver::new();
        let fault = driver.query("SELECT 1", None).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Interface);
        assert!(driver.close().is_ok());
    }
}
