//! Error types for framegraph operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during indexing, resolution, or persistence.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Storage backend failure
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Frame not found in the store or arena
    #[error("Frame not found: {frame_id}")]
    FrameNotFound { frame_id: String },

    /// Requested file does not exist on disk
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Operation is invalid in the current state
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// No transaction is open
    #[error("Transaction not active: {operation}")]
    TransactionInactive { operation: String },

    /// Serialization or deserialization failure
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Language front-end failure surfaced past the per-file recovery point
    #[error("Parser error: {0}")]
    Parser(#[from] framegraph_parser_api::ParserError),
}

impl IndexError {
    /// Create a storage error with an optional source.
    pub fn storage(
        message: impl Into<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        IndexError::Storage {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create a serialization error with an optional source.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        IndexError::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Create an invalid-operation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        IndexError::InvalidOperation {
            message: message.into(),
        }
    }
}

/// Result type for framegraph operations.
pub type Result<T> = std::result::Result<T, IndexError>;
