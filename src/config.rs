//! Connector settings: which engine to talk to, which configuration format to
//! read credentials from, and where that file lives.
//!
//! Settings are resolved exactly once, either from the process environment or
//! from a TOML settings file, and then passed down by value. Nothing below the
//! factory reads the environment again.
use crate::core::{ConnectorError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Selects the database engine. Ordinal, or case-insensitive name.
pub const ENGINE_ENV_VAR: &str = "DC_FACT_TYPE";
/// Selects the connection configuration format. Ordinal, or case-insensitive name.
pub const FORMAT_ENV_VAR: &str = "DC_CFG_FACT_TYPE";
/// Overrides the path of the connection configuration file.
pub const CONFIG_PATH_ENV_VAR: &str = "DC_CONN_CFG";

/// Directory holding the format-specific default configuration files.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/dbconnector";

/// Database engines the connector can be built for.
///
/// The discriminants are the stable ordinals accepted by [`ENGINE_ENV_VAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineKind {
    #[default]
    MySql = 1,
    Oracle = 2,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::MySql, EngineKind::Oracle];

    pub fn ordinal(self) -> i64 {
        self as i64
    }

    pub fn from_ordinal(ordinal: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.ordinal() == ordinal)
            .ok_or_else(|| ConnectorError::InvalidEngineSelector(ordinal.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::MySql => "MySql",
            EngineKind::Oracle => "Oracle",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<i64>() {
            return Self::from_ordinal(ordinal);
        }
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(EngineKind::MySql),
            "oracle" => Ok(EngineKind::Oracle),
            _ => Err(ConnectorError::InvalidEngineSelector(s.to_string())),
        }
    }
}

/// Formats a connection configuration file can be written in.
///
/// The discriminants are the stable ordinals accepted by [`FORMAT_ENV_VAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConfigFormat {
    #[default]
    Json = 1,
    Yaml = 2,
    Ini = 3,
    Xml = 4,
    Text = 5,
}

impl ConfigFormat {
    pub const ALL: [ConfigFormat; 5] = [
        ConfigFormat::Json,
        ConfigFormat::Yaml,
        ConfigFormat::Ini,
        ConfigFormat::Xml,
        ConfigFormat::Text,
    ];

    pub fn ordinal(self) -> i64 {
        self as i64
    }

    pub fn from_ordinal(ordinal: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.ordinal() == ordinal)
            .ok_or_else(|| ConnectorError::UnsupportedFormat(ordinal.to_string()))
    }

    /// File extension of the default configuration file for this format
    pub fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Ini => "ini",
            ConfigFormat::Xml => "xml",
            ConfigFormat::Text => "txt",
        }
    }

    /// Path used when no override is configured
    pub fn default_path(self) -> PathBuf {
        Path::new(DEFAULT_CONFIG_DIR).join(format!("connection.{}", self.extension()))
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigFormat::Json => "JSON",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Ini => "INI",
            ConfigFormat::Xml => "XML",
            ConfigFormat::Text => "Text",
        };
        f.write_str(name)
    }
}

impl FromStr for ConfigFormat {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<i64>() {
            return Self::from_ordinal(ordinal);
        }
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "ini" => Ok(ConfigFormat::Ini),
            "xml" => Ok(ConfigFormat::Xml),
            "text" | "txt" => Ok(ConfigFormat::Text),
            _ => Err(ConnectorError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Fully resolved connector settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectorSettings {
    pub engine: EngineKind,
    pub format: ConfigFormat,
    /// Explicit configuration file path; `None` means the format default
    pub config_path: Option<PathBuf>,
}

impl ConnectorSettings {
    pub fn new(engine: EngineKind, format: ConfigFormat) -> Self {
        Self {
            engine,
            format,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Resolves settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary variable lookup.
    ///
    /// Unset or blank variables fall back to the documented defaults; values
    /// that are set but name nothing in the closed selector sets are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let engine = match read(ENGINE_ENV_VAR) {
            Some(value) => value.parse()?,
            None => EngineKind::default(),
        };
        let format = match read(FORMAT_ENV_VAR) {
            Some(value) => value.parse()?,
            None => ConfigFormat::default(),
        };
        let config_path = read(CONFIG_PATH_ENV_VAR).map(PathBuf::from);

        Ok(Self {
            engine,
            format,
            config_path,
        })
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawSettings =
            toml::from_str(content).map_err(|e| ConnectorError::Settings(e.to_string()))?;

        let engine = match raw.engine {
            Some(selector) => selector.resolve::<EngineKind>()?,
            None => EngineKind::default(),
        };
        let format = match raw.format {
            Some(selector) => selector.resolve::<ConfigFormat>()?,
            None => ConfigFormat::default(),
        };

        Ok(Self {
            engine,
            format,
            config_path: raw.config_path,
        })
    }

    /// Loads settings from a TOML file at the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dbconnector::config::ConnectorSettings;
    ///
    /// let settings = ConnectorSettings::from_toml_file("connector.toml").expect("Failed to load settings");
    /// println!("{:?}", settings);
    /// ```
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Configuration file path the active reader should load
    pub fn resolved_config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.format.default_path())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    engine: Option<Selector>,
    format: Option<Selector>,
    config_path: Option<PathBuf>,
}

/// A selector written either as its ordinal or as its name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Selector {
    Ordinal(i64),
    Name(String),
}

impl Selector {
    fn resolve<T: FromStr<Err = ConnectorError>>(self) -> Result<T> {
        match self {
            Selector::Ordinal(ordinal) => ordinal.to_string().parse(),
            Selector::Name(name) => name.parse(),
        }
    }
}
