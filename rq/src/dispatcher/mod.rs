//! Rate-paced dispatcher
//!
//! Producers submit requests tagged with a [`crate::Priority`]; a single
//! background loop takes one rate-limiter token per request, pops the next
//! request from the weighted priority queue, executes it on a [`Transport`]
//! and hands the result back on that request's one-shot channel.

mod config;
mod core;
mod error;
mod limiter;
mod task;
mod transport;

pub use self::core::{DispatchStats, Dispatcher, DispatcherState};
pub use config::DispatcherConfig;
pub use error::DispatchError;
pub use limiter::{GovernorLimiter, LimiterError, LimiterKind, MAX_RATE_PER_SEC, Pacer, RateLimiter};
pub use task::{Completion, Pending, Task, TaskResult};
pub use transport::Transport;
