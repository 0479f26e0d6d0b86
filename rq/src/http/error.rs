//! HTTP client error types

use thiserror::Error;

use crate::dispatcher::DispatchError;

/// Errors returned by [`super::QueuedHttpClient`]
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build request: {0}")]
    RequestBuild(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Client closed")]
    Closed,

    #[error("Queue full: {limit} requests pending")]
    QueueFull { limit: usize },

    #[error("Request dropped before completion")]
    Dropped,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HttpError {
    /// Check if the request never reached the queue because it was malformed
    pub fn is_request_build(&self) -> bool {
        matches!(self, HttpError::RequestBuild(_))
    }

    /// Check if the request was refused or lost because of shutdown
    pub fn is_shutdown(&self) -> bool {
        matches!(self, HttpError::Closed | HttpError::Dropped)
    }
}

impl From<DispatchError<reqwest::Error>> for HttpError {
    fn from(err: DispatchError<reqwest::Error>) -> Self {
        match err {
            DispatchError::Transport(e) => HttpError::Transport(e),
            DispatchError::Closed => HttpError::Closed,
            DispatchError::QueueFull { limit } => HttpError::QueueFull { limit },
            DispatchError::Dropped => HttpError::Dropped,
            DispatchError::Config(message) => HttpError::Config(message),
        }
    }
}
