//! Queue error types

use thiserror::Error;

use crate::priority::Priority;

/// Errors raised by [`super::WeightedPriorityQueue`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueError {
    #[error("Queue pop failed, queue empty")]
    Empty,

    #[error("Queue full: {limit} entries pending")]
    Full { limit: usize },

    #[error("Invalid weight for {priority}: {value}")]
    InvalidWeight { priority: Priority, value: f64 },

    #[error("Queue state inconsistent: {0}")]
    Inconsistent(String),
}

impl QueueError {
    /// Whether the dispatch loop can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QueueError::Empty | QueueError::Full { .. })
    }
}
