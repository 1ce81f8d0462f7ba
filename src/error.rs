// src/error.rs

//! Unified error handling for the scraper application.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required structural anchor was missing from a markup fragment.
    /// The affected record is skipped; the run continues.
    #[error("Malformed record in {context}: {message}")]
    MalformedRecord { context: String, message: String },

    /// The timeline has no further items. Control-flow signal, not a
    /// failure: callers must treat it as successful termination.
    #[error("no more items available")]
    NoMoreItems,

    /// A record could not be located on re-fetch (hydrate flow).
    #[error("record unavailable: {0}")]
    SessionUnavailable(String),

    /// Browser session or navigation failure.
    #[error("Session error: {0}")]
    Session(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a malformed-record error with context.
    pub fn malformed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedRecord {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a session error.
    pub fn session(message: impl fmt::Display) -> Self {
        Self::Session(message.to_string())
    }

    /// Create a record-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::SessionUnavailable(message.into())
    }
}
