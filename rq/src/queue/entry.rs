//! Entry and snapshot types for the priority queue

use tokio::time::Instant;

use crate::priority::Priority;

/// An item held by the queue together with the level it was pushed at
#[derive(Debug)]
pub struct QueueEntry<T> {
    pub item: T,
    pub priority: Priority,
    pub enqueued_at: Instant,
}

impl<T> QueueEntry<T> {
    pub(crate) fn new(item: T, priority: Priority) -> Self {
        Self {
            item,
            priority,
            enqueued_at: Instant::now(),
        }
    }

    /// Unwrap the stored item
    pub fn into_item(self) -> T {
        self.item
    }
}

/// Point-in-time view of the queue, for logging and display
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QueueSnapshot {
    /// Entries queued per level, indexed by [`Priority::index`]
    pub depths: [usize; Priority::COUNT],
    /// Current weight per level
    pub weights: [f64; Priority::COUNT],
    /// Level the next pop will serve
    pub next: Option<Priority>,
    pub total: usize,
}

impl QueueSnapshot {
    /// Entries queued at one level
    pub fn depth(&self, priority: Priority) -> usize {
        self.depths[priority.index()]
    }
}
