//! INI connection configuration.
//!
//! ```text
//! [MySql]
//! Host = db.internal
//! Port = 3306
//! ```
use super::{insert_entry, ConfigSourceReader, RawTree};
use crate::config::ConfigFormat;
use crate::core::{ConnectorError, Result};
use serde_json::{Map, Value};

/// Reads `[Section]` headers followed by `Key = Value` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniReader;

impl ConfigSourceReader for IniReader {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Ini
    }

    fn parse(&self, content: &str) -> Result<RawTree> {
        let mut root = Map::new();
        let mut current: Option<String> = None;

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| ConnectorError::parse(format!("line {}: malformed section header", line_no)))?;
                root.entry(name.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                current = Some(name.to_string());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ConnectorError::parse(format!("line {}: expected 'key = value'", line_no)))?;
            let section = current
                .as_deref()
                .ok_or_else(|| ConnectorError::parse(format!("line {}: key outside of any section", line_no)))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConnectorError::parse(format!("line {}: empty key", line_no)));
            }
            insert_entry(&mut root, section, key, value)?;
        }

        Ok(Value::Object(root))
    }
}
