//! Weighted priority queue
//!
//! Holds pending work grouped by [`crate::Priority`] and serves the level
//! whose backlog, scaled by a per-level multiplier, is currently largest.
//! This keeps urgent work ahead while still bounding how long a growing
//! low-priority backlog can be ignored.

mod config;
mod core;
mod entry;
mod error;

pub use config::{
    DEFAULT_WEIGHT_HIGH, DEFAULT_WEIGHT_IMMEDIATE, DEFAULT_WEIGHT_LOW, DEFAULT_WEIGHT_MEDIUM, PriorityWeights,
};
pub use self::core::WeightedPriorityQueue;
pub use entry::{QueueEntry, QueueSnapshot};
pub use error::QueueError;
