// src/error.rs

//! Unified error handling for the closings watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A source page could not be fetched
    #[error("Fetch error for {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    /// A single candidate entry could not be extracted
    #[error("Extraction error for {source_name}: {message}")]
    Extraction {
        source_name: String,
        message: String,
    },

    /// Snapshot publishing failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Alert delivery was not confirmed
    #[error("Notify error: {0}")]
    Notify(String),

    /// Storm state could not be loaded or saved
    #[error("State store error: {0}")]
    State(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error for a source.
    pub fn fetch(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error for a source.
    pub fn extraction(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extraction {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn publish(message: impl fmt::Display) -> Self {
        Self::Publish(message.to_string())
    }

    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    pub fn state(message: impl fmt::Display) -> Self {
        Self::State(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_source() {
        let err = AppError::fetch("WFSB", "timed out after 8s");
        assert_eq!(err.to_string(), "Fetch error for WFSB: timed out after 8s");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
