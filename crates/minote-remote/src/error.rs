//! Error types for the Mi Notes HTTP client

use minote_core::RemoteError;
use thiserror::Error;

/// Errors that can occur when talking to the Mi Notes web service
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Session cookie missing, expired or rejected
    #[error("Unauthorized: session cookie rejected")]
    Unauthorized,

    /// Envelope carried a non-zero code
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Too many retry attempts
    #[error("Too many retry attempts ({attempts}): {last}")]
    TooManyRetries { attempts: u32, last: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::RequestFailed(e) if e.is_decode() => RemoteError::Decode(e.to_string()),
            ClientError::RequestFailed(e) => RemoteError::Transport(e.to_string()),
            ClientError::HttpError { status, message } => RemoteError::HttpStatus { status, message },
            ClientError::Unauthorized => RemoteError::Unauthorized,
            ClientError::Api { code, message } => RemoteError::Api { code, message },
            ClientError::InvalidResponse(msg) => RemoteError::Decode(msg),
            ClientError::TooManyRetries { attempts, last } => {
                RemoteError::TooManyRetries { attempts, last }
            }
            ClientError::InvalidConfig(msg) => RemoteError::Protocol(msg),
        }
    }
}
