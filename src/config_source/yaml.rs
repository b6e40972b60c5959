//! YAML connection configuration.
use super::{ConfigSourceReader, RawTree};
use crate::config::ConfigFormat;
use crate::core::{ConnectorError, Result};

/// Reads a YAML mapping with the same layout as the JSON format.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlReader;

impl ConfigSourceReader for YamlReader {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Yaml
    }

    fn parse(&self, content: &str) -> Result<RawTree> {
        serde_yaml::from_str(content).map_err(|e| ConnectorError::parse(format!("invalid YAML: {}", e)))
    }
}
