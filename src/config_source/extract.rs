//! Extraction of engine sections from a normalized configuration tree.
//!
//! Every reader produces the same `RawTree` shape, so the key names below are
//! the only place the on-disk layout is spelled out.
use super::connection_config::{ConnectionConfig, MySqlConfig, OracleConfig};
use super::RawTree;
use crate::core::{ConnectorError, Result};
use serde_json::{Map, Value};

pub const MYSQL_SECTION: &str = "MySql";
pub const ORACLE_SECTION: &str = "Oracle";

pub const KEY_DATABASE: &str = "Database";
pub const KEY_HOST: &str = "Host";
pub const KEY_PORT: &str = "Port";
pub const KEY_NAME: &str = "Name";
pub const KEY_USER: &str = "User";
pub const KEY_PASSWORD: &str = "Password";
pub const KEY_SERVICE_NAME: &str = "ServiceName";

/// Builds the MySQL configuration from the `MySql` section.
pub fn mysql(tree: &RawTree) -> Result<ConnectionConfig> {
    let section = Section::open(tree, MYSQL_SECTION)?;
    Ok(ConnectionConfig::MySql(MySqlConfig {
        database: section.text(KEY_DATABASE)?,
        host: section.text(KEY_HOST)?,
        port: section.port()?,
        name: section.text(KEY_NAME)?,
        user: section.text(KEY_USER)?,
        password: section.secret(KEY_PASSWORD)?,
    }))
}

/// Builds the Oracle configuration from the `Oracle` section.
pub fn oracle(tree: &RawTree) -> Result<ConnectionConfig> {
    let section = Section::open(tree, ORACLE_SECTION)?;
    Ok(ConnectionConfig::Oracle(OracleConfig {
        database: section.text(KEY_DATABASE)?,
        host: section.text(KEY_HOST)?,
        port: section.port()?,
        service_name: section.text(KEY_SERVICE_NAME)?,
        name: section.text(KEY_NAME)?,
        user: section.text(KEY_USER)?,
        password: section.secret(KEY_PASSWORD)?,
    }))
}

struct Section<'a> {
    name: &'static str,
    entries: &'a Map<String, Value>,
}

impl<'a> Section<'a> {
    fn open(tree: &'a RawTree, name: &'static str) -> Result<Self> {
        let root = tree
            .as_object()
            .ok_or_else(|| ConnectorError::parse("configuration root is not a key/value mapping"))?;
        let entries = root
            .get(name)
            .ok_or_else(|| ConnectorError::parse(format!("missing section '{}'", name)))?
            .as_object()
            .ok_or_else(|| ConnectorError::parse(format!("section '{}' is not a key/value mapping", name)))?;
        Ok(Section { name, entries })
    }

    fn value(&self, key: &str) -> Result<&'a Value> {
        match self.entries.get(key) {
            Some(Value::Null) | None => Err(ConnectorError::parse(format!(
                "missing key '{}' in section '{}'",
                key, self.name
            ))),
            Some(value) => Ok(value),
        }
    }

    /// A present value rendered as a string; may be empty.
    fn secret(&self, key: &str) -> Result<String> {
        match self.value(key)? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(ConnectorError::parse(format!(
                "key '{}' in section '{}' must be a scalar",
                key, self.name
            ))),
        }
    }

    /// A present, non-blank value, returned as written.
    fn text(&self, key: &str) -> Result<String> {
        let value = self.secret(key)?;
        if value.trim().is_empty() {
            return Err(ConnectorError::parse(format!(
                "key '{}' in section '{}' is empty",
                key, self.name
            )));
        }
        Ok(value)
    }

    fn port(&self) -> Result<u16> {
        let invalid = || {
            ConnectorError::parse(format!(
                "key '{}' in section '{}' is not a valid port",
                KEY_PORT, self.name
            ))
        };
        let port = match self.value(KEY_PORT)? {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        };
        port.filter(|p| *p != 0).ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RawTree {
        json!({
            "MySql": {
                "Database": "d", "Host": "h", "Port": 3306,
                "Name": "n", "User": "u", "Password": "p"
            },
            "Oracle": {
                "Database": "od", "Host": "oh", "Port": "1521", "ServiceName": "XE",
                "Name": "on", "User": "ou", "Password": ""
            }
        })
    }

    #[test]
    fn test_extract_mysql() {
        let config = mysql(&sample()).unwrap();
        assert_eq!(
            config,
            ConnectionConfig::MySql(MySqlConfig {
                database: "d".to_string(),
                host: "h".to_string(),
                port: 3306,
                name: "n".to_string(),
                user: "u".to_string(),
                password: "p".to_string(),
            })
        );
    }

    #[test]
    fn test_extract_oracle_with_string_port_and_empty_password() {
        let config = oracle(&sample()).unwrap();
        assert_eq!(config.port(), 1521);
        assert_eq!(config.service_name(), Some("XE"));
        assert_eq!(config.password(), "");
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let mut tree = sample();
        tree["Oracle"].as_object_mut().unwrap().remove("ServiceName");
        match oracle(&tree) {
            Err(ConnectorError::ConfigParse(msg)) => assert!(msg.contains("ServiceName")),
            other => panic!("Expected ConfigParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let tree = json!({ "Oracle": {} });
        assert!(matches!(mysql(&tree), Err(ConnectorError::ConfigParse(_))));
    }

    #[test]
    fn test_blank_and_invalid_values_rejected() {
        let mut tree = sample();
        tree["MySql"]["Host"] = json!("   ");
        assert!(mysql(&tree).is_err());

        let mut tree = sample();
        tree["MySql"]["User"] = json!(" padded ");
        assert_eq!(mysql(&tree).unwrap().user(), " padded ");

        for port in [json!(0), json!(70000), json!("abc"), json!(-1), json!([3306])] {
            let mut tree = sample();
            tree["MySql"]["Port"] = port;
            assert!(mysql(&tree).is_err());
        }
    }
}
