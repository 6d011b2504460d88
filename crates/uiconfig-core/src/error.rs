//! Error types for the uiconfig system
//!
//! Most runtime problems in the binding layer (unresolvable paths, rejected
//! writes, malformed listeners) are logged and skipped rather than returned.
//! The variants here cover the cases a caller has to handle.

use thiserror::Error;

/// Result type alias for uiconfig operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the uiconfig system
#[derive(Error, Debug)]
pub enum Error {
    /// A field was registered twice on the same class
    #[error("Property {property} of class {class} already has a field descriptor")]
    DuplicateField {
        /// Class name
        class: String,
        /// Property key
        property: String,
    },

    /// Registry errors other than duplicates
    #[error("Registry error: {0}")]
    Registry(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A deferred operation was dropped before its dispatch phase fired
    #[error("Deferred operation cancelled: {0}")]
    Cancelled(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a duplicate field error
    pub fn duplicate_field(class: impl Into<String>, property: impl Into<String>) -> Self {
        Self::DuplicateField {
            class: class.into(),
            property: property.into(),
        }
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
