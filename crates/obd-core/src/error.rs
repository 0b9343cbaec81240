//! Common error types for vehicle definitions and devices

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors shared by definition loading, device access and logging
#[derive(Debug, Error)]
pub enum CoreError {
    /// A file required for reading or writing could not be opened
    #[error("Cannot open {}: {reason}", path.display())]
    FileUnavailable {
        /// Path that was being opened
        path: PathBuf,
        /// Underlying reason reported by the OS
        reason: String,
    },

    /// Declarative file content failed schema validation
    #[error("Malformed definition: {0}")]
    MalformedDefinition(String),

    /// Device connection or capability discovery failed
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A lookup by identity found no match
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write failure on an already open sink
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error kind, for callers that branch on the class of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileUnavailable,
    MalformedDefinition,
    DeviceUnavailable,
    NotFound,
    Io,
}

impl CoreError {
    /// Build a `FileUnavailable` error from an I/O failure on `path`
    pub fn file_unavailable(path: impl AsRef<Path>, err: &std::io::Error) -> Self {
        CoreError::FileUnavailable {
            path: path.as_ref().to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::FileUnavailable { .. } => ErrorKind::FileUnavailable,
            CoreError::MalformedDefinition(_) => ErrorKind::MalformedDefinition,
            CoreError::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::MalformedDefinition(err.to_string())
    }
}
