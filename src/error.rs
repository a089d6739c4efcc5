//! Error types for h5node
//!
//! Provides a unified error type for all operations. Every failure is a
//! distinct variant so callers can tell `AlreadyExists` apart from `Io`.

use thiserror::Error;

use crate::types::TypeClass;

/// Result type alias using H5Error
pub type Result<T> = std::result::Result<T, H5Error>;

/// Unified error type for h5node operations
#[derive(Debug, Error)]
pub enum H5Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Object Model Errors
    // -------------------------------------------------------------------------
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File is opened read-only: {0}")]
    ReadOnly(String),

    // -------------------------------------------------------------------------
    // Type / Shape Errors
    // -------------------------------------------------------------------------
    #[error("Shape mismatch: dataspace holds {expected} elements, value has {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Type mismatch: stored type is {stored}, requested {requested}")]
    TypeMismatch {
        stored: TypeClass,
        requested: TypeClass,
    },

    #[error("Invalid type descriptor: {0}")]
    InvalidType(String),

    // -------------------------------------------------------------------------
    // File Open Errors
    // -------------------------------------------------------------------------
    #[error("Invalid open flags: {0}")]
    InvalidFlags(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Journal corruption detected: {0}")]
    JournalCorruption(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl H5Error {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub(crate) fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists(what.into())
    }

    pub(crate) fn invalid_argument(what: impl Into<String>) -> Self {
        Self::InvalidArgument(what.into())
    }

    /// True for `NotFound`; used where a missing object is an answer, not a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<bincode::Error> for H5Error {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
