//! Client error types.

use std::fmt;

use eventscout_core::{ProfileError, TracingError};
use eventscout_server::{ServerError, StoreError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Event store error.
    Store(StoreError),
    /// Serve loop error.
    Server(ServerError),
    /// Registration answer rejected.
    Profile(ProfileError),
    /// Logging could not be set up.
    Tracing(TracingError),
    /// Output could not be rendered.
    Render(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Store(err) => write!(f, "event store error: {}", err),
            Self::Server(err) => write!(f, "{}", err),
            Self::Profile(err) => write!(f, "profile error: {}", err),
            Self::Tracing(err) => write!(f, "{}", err),
            Self::Render(msg) => write!(f, "render error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Server(err) => Some(err),
            Self::Profile(err) => Some(err),
            Self::Tracing(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(_) | Self::Render(_) => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<ServerError> for ClientError {
    fn from(err: ServerError) -> Self {
        Self::Server(err)
    }
}

impl From<ProfileError> for ClientError {
    fn from(err: ProfileError) -> Self {
        Self::Profile(err)
    }
}

impl From<TracingError> for ClientError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}
