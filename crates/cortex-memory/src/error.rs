//! Error types for CORTEX memory

use thiserror::Error;

/// Main error type for CORTEX memory operations
#[derive(Error, Debug)]
pub enum CortexError {
    /// Storage-related errors (SQLite, file system, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl From<serde_json::Error> for CortexError {
    fn from(e: serde_json::Error) -> Self {
        CortexError::Serialization(e.to_string())
    }
}

/// Result type alias for CORTEX memory operations
pub type Result<T> = std::result::Result<T, CortexError>;
