/// Configuration Source Module
///
/// Reads connection credentials from a configuration file and turns them into
/// [`ConnectionConfig`] transfer objects.
///
/// ## Architecture
///
/// - **Readers** (`json.rs`, `yaml.rs`, `ini.rs`, `xml.rs`, `text.rs`): one per
///   [`ConfigFormat`]. A reader only knows how to parse its syntax into a
///   [`RawTree`].
/// - **Extraction** (`extract.rs`): shared by all readers, so every format uses
///   the same section and key names and the same failure semantics.
/// - **Factory** ([`ConfigSourceFactory`]): maps a format selector to a reader
///   and resolves the file path once.
pub mod connection_config;
pub mod extract;
pub mod ini;
pub mod json;
pub mod text;
pub mod xml;
pub mod yaml;

pub use connection_config::{ConnectionConfig, MySqlConfig, OracleConfig};

use crate::config::{ConfigFormat, ConnectorSettings, EngineKind};
use crate::core::{ConnectorError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Normalized key/value tree every reader parses into.
pub type RawTree = Value;

/// A reader for one configuration syntax.
pub trait ConfigSourceReader: Send + Sync {
    fn format(&self) -> ConfigFormat;

    /// Parses file content into a tree. Syntax errors are `ConfigParse`.
    fn parse(&self, content: &str) -> Result<RawTree>;

    /// Override path if given, otherwise this format's default path
    fn resolve_path(&self, path_override: Option<&Path>) -> PathBuf {
        path_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.format().default_path())
    }

    /// Reads and parses the file at `path`.
    ///
    /// A missing file is `ConfigNotFound`; unparsable content, or content whose
    /// root is not a key/value mapping, is `ConfigParse`.
    fn load(&self, path: &Path) -> Result<RawTree> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConnectorError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            ErrorKind::InvalidData => ConnectorError::parse(format!("{}: {}", path.display(), e)),
            _ => ConnectorError::Io(e),
        })?;

        let tree = self.parse(&content).map_err(|e| match e {
            ConnectorError::ConfigParse(reason) => {
                ConnectorError::ConfigParse(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })?;

        if !tree.is_object() {
            return Err(ConnectorError::parse(format!(
                "{}: configuration root is not a key/value mapping",
                path.display()
            )));
        }
        Ok(tree)
    }

    fn extract_mysql(&self, tree: &RawTree) -> Result<ConnectionConfig> {
        extract::mysql(tree)
    }

    fn extract_oracle(&self, tree: &RawTree) -> Result<ConnectionConfig> {
        extract::oracle(tree)
    }

    fn extract(&self, tree: &RawTree, engine: EngineKind) -> Result<ConnectionConfig> {
        match engine {
            EngineKind::MySql => self.extract_mysql(tree),
            EngineKind::Oracle => self.extract_oracle(tree),
        }
    }
}

/// Picks the reader for a configuration format.
///
/// The format and path override are fixed when the factory is built; the
/// factory never consults the environment afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSourceFactory {
    format: ConfigFormat,
    path_override: Option<PathBuf>,
}

impl ConfigSourceFactory {
    pub fn new(format: ConfigFormat, path_override: Option<PathBuf>) -> Self {
        Self {
            format,
            path_override,
        }
    }

    pub fn from_settings(settings: &ConnectorSettings) -> Self {
        Self::new(settings.format, settings.config_path.clone())
    }

    /// Maps a format to its reader.
    pub fn select(format: ConfigFormat) -> Box<dyn ConfigSourceReader> {
        match format {
            ConfigFormat::Json => Box::new(json::JsonReader),
            ConfigFormat::Yaml => Box::new(yaml::YamlReader),
            ConfigFormat::Ini => Box::new(ini::IniReader),
            ConfigFormat::Xml => Box::new(xml::XmlReader),
            ConfigFormat::Text => Box::new(text::TextReader),
        }
    }

    /// Maps a raw format ordinal to its reader; `UnsupportedFormat` when the
    /// ordinal is outside the closed set.
    pub fn select_ordinal(ordinal: i64) -> Result<Box<dyn ConfigSourceReader>> {
        ConfigFormat::from_ordinal(ordinal).map(Self::select)
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn reader(&self) -> Box<dyn ConfigSourceReader> {
        Self::select(self.format)
    }

    pub fn config_path(&self) -> PathBuf {
        self.reader().resolve_path(self.path_override.as_deref())
    }

    /// Loads the configuration file and extracts the section for `engine`.
    pub fn load_connection_config(&self, engine: EngineKind) -> Result<ConnectionConfig> {
        let reader = self.reader();
        let path = reader.resolve_path(self.path_override.as_deref());
        debug!(path = %path.display(), format = %self.format, engine = %engine, "Loading connection configuration");

        let result = reader
            .load(&path)
            .and_then(|tree| reader.extract(&tree, engine));
        if let Err(e) = &result {
            error!(path = %path.display(), format = %self.format, "Failed to load connection configuration: {}", e);
        }
        result
    }
}

/// Strips one pair of matching surrounding quotes.
pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Sets `root[section][key] = value`, creating the section when needed.
/// Later assignments to the same key win.
pub(crate) fn insert_entry(root: &mut Map<String, Value>, section: &str, key: &str, value: &str) -> Result<()> {
    let entry = root
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    match entry {
        Value::Object(entries) => {
            entries.insert(key.to_string(), Value::String(unquote(value).to_string()));
            Ok(())
        }
        _ => Err(ConnectorError::parse(format!("'{}' is not a section", section))),
    }
}
