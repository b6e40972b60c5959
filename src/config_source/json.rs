//! JSON connection configuration.
use super::{ConfigSourceReader, RawTree};
use crate::config::ConfigFormat;
use crate::core::{ConnectorError, Result};

/// Reads a single JSON object with `MySql` and `Oracle` members.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl ConfigSourceReader for JsonReader {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }

    fn parse(&self, content: &str) -> Result<RawTree> {
        serde_json::from_str(content).map_err(|e| ConnectorError::parse(format!("invalid JSON: {}", e)))
    }
}
