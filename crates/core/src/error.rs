//! Error types for the authscope system.
//!
//! Classification itself never fails; these errors only surface while loading
//! configuration or turning stored transactions into records.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the authscope system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored transaction could not be turned into a record.
    #[error("Record error: {0}")]
    Record(String),

    /// A required field was absent or empty.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a record error.
    pub fn record(msg: impl Into<String>) -> Self {
        Error::Record(msg.into())
    }
}
