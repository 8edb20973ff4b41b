//! Error types for Recast.

use thiserror::Error;

/// Result type alias for Recast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Recast.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// One or more request fields failed validation
    #[error("{0}")]
    Validation(String),

    /// The requested mutation collides with existing state
    #[error("{0}")]
    Conflict(String),

    /// The timer store is inside an external editing session
    #[error("{0}")]
    StoreBusy(String),

    /// Unknown timer, channel, or resource
    #[error("{0}")]
    NotFound(String),

    /// Listing requested in a format the service does not produce
    #[error("{0}")]
    UnsupportedFormat(String),

    /// A timer descriptor failed to parse despite passing field validation
    #[error("{0}")]
    Encoding(String),

    /// Other errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
