/// Connector Error Module
///
/// Construction-time failures of the connector: selector resolution,
/// configuration lookup and configuration parsing. These abort factory
/// construction and are returned as `Err`. Failures talking to a live engine
/// are never represented here; they travel as data inside a `QueryResult`.
use std::path::PathBuf;
use thiserror::Error;

/// Hard failures raised while building a connector.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The engine selector named something outside the closed `EngineKind` set
    #[error("Invalid engine selector: {0}")]
    InvalidEngineSelector(String),

    /// The config-format selector named something outside the closed `ConfigFormat` set
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// The resolved configuration path does not exist
    #[error("Connection configuration file '{}' not found", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The configuration exists but its content is unusable
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// File system errors other than a missing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid connector settings file
    #[error("Settings error: {0}")]
    Settings(String),
}

impl ConnectorError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        ConnectorError::ConfigParse(reason.into())
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::ConfigParse(err.to_string())
    }
}

/// Type alias for Result to use ConnectorError as the error type.
pub type Result<T> = std::result::Result<T, ConnectorError>;
