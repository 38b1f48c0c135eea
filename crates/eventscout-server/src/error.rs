//! Server error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for event store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised by the event store.
///
/// Every store failure is surfaced to the caller; a failed `insert_all`
/// has written nothing.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be created.
    #[error("cannot create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Tags could not be encoded for storage.
    #[error("cannot encode tags: {0}")]
    Tags(#[from] serde_json::Error),

    /// A previous holder of the connection panicked.
    #[error("event store lock poisoned")]
    LockPoisoned,

    /// The blocking task running the store call panicked or was cancelled.
    #[error("event store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Creates a directory creation error.
    pub fn create_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Event store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
