//! Error types for the bookmark navigator.
//!
//! `StorageError` covers everything a repository can reject, `ValidationError`
//! covers user input that needs a confirmation round-trip, and `ApiError` is the
//! umbrella returned by session and CLI operations.

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised by a bookmark repository.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Node is not a folder: {0}")]
    NotAFolder(NodeId),

    #[error("Node is not a link: {0}")]
    NotALink(NodeId),

    #[error("The virtual root cannot be modified")]
    RootImmutable,

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Record encoding error: {0}")]
    Codec(String),

    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(io) => StorageError::IoError(io),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Input problems surfaced to the user as a re-confirmable prompt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A link needs a url")]
    UrlRequired,

    #[error("The url '{url}' may be malformed; submit again to save it anyway")]
    SuspiciousUrl { url: String },
}

/// Top-level error for session, configuration and CLI operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Another change is still in progress: {0}")]
    Busy(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(NodeId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl ApiError {
    /// True when the error came from the backing store rather than the user.
    pub fn is_storage(&self) -> bool {
        matches!(self, ApiError::StorageError(_))
    }
}
