//! Error types for fallible helpers
//!
//! Building a spec, validating and coercing never fail; problems there are
//! reported as codes. These errors come from the surfaces around them:
//! loading configuration text, reading files and exporting metrics.

use thiserror::Error;

/// Main error type for loaders and exporters
#[derive(Error, Debug)]
pub enum SpecError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    Io(String),

    /// Configuration text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Metrics registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl SpecError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        SpecError::InvalidInput(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        SpecError::Parse(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SpecError::InvalidInput(_) | SpecError::Io(_) | SpecError::Parse(_)
        )
    }
}

impl From<std::io::Error> for SpecError {
    fn from(err: std::io::Error) -> Self {
        SpecError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SpecError {
    fn from(err: serde_json::Error) -> Self {
        SpecError::Parse(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for SpecError {
    fn from(err: serde_yaml::Error) -> Self {
        SpecError::Parse(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for SpecError {
    fn from(err: toml::de::Error) -> Self {
        SpecError::Parse(format!("TOML error: {}", err))
    }
}

/// Result type alias for fallible helpers
pub type Result<T> = std::result::Result<T, SpecError>;
