use std::error::Error;
use std::fmt::{self, Display};

/// Typed errors surfaced by the loading binaries.
#[derive(Debug)]
pub enum StoreError {
    /// No source files were found where the caller pointed us.
    NoSources(String),
    /// The configuration file was present but unusable.
    Config(String),
    /// Fallback for other textual errors.
    Other(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NoSources(s) => write!(f, "no source files: {}", s),
            StoreError::Config(s) => write!(f, "config error: {}", s),
            StoreError::Other(s) => write!(f, "error: {}", s),
        }
    }
}

impl Error for StoreError {}

// Conversions from common error types into StoreError for easier propagation in binaries.
impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Other(e.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        StoreError::Config(e.to_string())
    }
}
