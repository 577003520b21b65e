//! Error types for chronograph
//!
//! Provides the error hierarchy shared by every stage of the query
//! pipeline and the storage backends.

use thiserror::Error;

/// The main error type for chronograph operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexical Errors ==========
    #[error("lex error: unrecognized sequence {0}")]
    Lex(String),

    // ========== Parse Errors ==========
    #[error("parse error: found {found}, expected one of {expected}")]
    Parse { found: String, expected: String },

    // ========== Semantic Errors ==========
    #[error("semantic error: {0}")]
    Semantic(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("invalid time anchor: {0}")]
    InvalidTimeAnchor(String),

    // ========== Storage Errors ==========
    #[error("graph not found: {0}")]
    GraphNotFound(String),

    #[error("graph already exists: {0}")]
    GraphExists(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ========== Internal Errors ==========
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for chronograph operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if this error was raised while turning text into tokens
    /// or tokens into a statement.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Error::Lex(_)
                | Error::Parse { .. }
                | Error::Semantic(_)
                | Error::TypeMismatch { .. }
                | Error::InvalidTimeAnchor(_)
        )
    }

    /// Returns true if this error came from the storage backend.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Error::GraphNotFound(_) | Error::GraphExists(_) | Error::Storage(_)
        )
    }
}
