//! Dispatcher error types

use thiserror::Error;

/// Errors returned to producers by the dispatcher
///
/// `E` is the transport's own error type, passed through untouched.
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    #[error("Transport error: {0}")]
    Transport(#[source] E),

    #[error("Dispatcher closed")]
    Closed,

    #[error("Queue full: {limit} requests pending")]
    QueueFull { limit: usize },

    #[error("Task dropped before a result was delivered")]
    Dropped,

    #[error("Invalid dispatcher configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_display() {
        assert_eq!(DispatchError::<Boom>::Closed.to_string(), "Dispatcher closed");
        assert_eq!(
            DispatchError::<Boom>::QueueFull { limit: 4 }.to_string(),
            "Queue full: 4 requests pending"
        );
    }

    #[test]
    fn test_transport_passthrough() {
        let err = DispatchError::Transport(Boom);
        assert_eq!(err.to_string(), "Transport error: boom");
        assert!(std::error::Error::source(&err).is_some());
        assert!(matches!(err, DispatchError::Transport(Boom)));
    }
}
