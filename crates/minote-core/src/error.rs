//! Error types shared by the collaborator traits.

use thiserror::Error;

/// Errors raised by a [`crate::RemoteNoteService`]
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Session rejected by remote service (cookie expired?)")]
    Unauthorized,

    #[error("Remote service returned code {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    TooManyRetries { attempts: u32, last: String },
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised by [`crate::VaultStorage`] and [`crate::LedgerStore`]
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
