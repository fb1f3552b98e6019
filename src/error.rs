//! Error types for membuffer
//!
//! Provides a unified error type for all buffer and iterator operations.

use thiserror::Error;

/// Result type alias using BufferError
pub type Result<T> = std::result::Result<T, BufferError>;

/// Unified error type for membuffer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    /// No staged entry for the exact key. Callers usually fall back to the
    /// layer underneath the buffer.
    #[error("Key not found")]
    NotFound,

    // -------------------------------------------------------------------------
    // Iterator Errors
    // -------------------------------------------------------------------------
    #[error("Iterator is not positioned at an entry")]
    InvalidIterator,

    #[error("Iterator has been closed")]
    IteratorClosed,

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    /// Internal failure. The buffer instance should not be used further.
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    #[error("Size limit exceeded: {requested} bytes requested, limit is {limit}")]
    SizeLimitExceeded { limit: usize, requested: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BufferError {
    /// True for `NotFound`, the only error a caller is expected to handle
    /// routinely.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BufferError::NotFound)
    }
}
