//! Plain-text connection configuration: one `Section.Key = Value` per line.
use super::{insert_entry, ConfigSourceReader, RawTree};
use crate::config::ConfigFormat;
use crate::core::{ConnectorError, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReader;

impl ConfigSourceReader for TextReader {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Text
    }

    fn parse(&self, content: &str) -> Result<RawTree> {
        let mut root = Map::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || {
                ConnectorError::parse(format!(
                    "line {}: expected 'Section.Key = Value'",
                    index + 1
                ))
            };
            let (path, value) = line.split_once('=').ok_or_else(malformed)?;
            let (section, key) = path.trim().split_once('.').ok_or_else(malformed)?;
            let (section, key) = (section.trim(), key.trim());
            if section.is_empty() || key.is_empty() {
                return Err(malformed());
            }
            insert_entry(&mut root, section, key, value)?;
        }

        Ok(Value::Object(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_extract() {
        let content = "\
# MySQL
MySql.Database = d
MySql.Host = h
MySql.Port = 3306
MySql.Name = n
MySql.User = u
MySql.Password = p
";
        let tree = TextReader.parse(content).unwrap();
        let config = TextReader.extract_mysql(&tree).unwrap();
        assert_eq!(config.name(), "n");
        assert_eq!(config.port(), 3306);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(TextReader.parse("Host = h"), Err(ConnectorError::ConfigParse(_))));
        assert!(matches!(TextReader.parse("MySql.Host"), Err(ConnectorError::ConfigParse(_))));
        assert!(matches!(TextReader.parse(".Host = h"), Err(ConnectorError::ConfigParse(_))));
    }
}
