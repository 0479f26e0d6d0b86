//! ratequeue - priority-weighted, rate-paced request dispatching
//!
//! Producers submit requests tagged with a [`Priority`]. A single background
//! loop pulls them from a [`WeightedPriorityQueue`], waits for a
//! [`RateLimiter`] token, and executes them through a [`Transport`]. Each
//! producer receives exactly the result of its own request.
//!
//! [`QueuedHttpClient`] binds the dispatcher to `reqwest`, and [`PostsApi`]
//! is a small typed wrapper on top of it.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod posts;
pub mod priority;
pub mod queue;

pub use config::Config;
pub use dispatcher::{
    DispatchError, DispatchStats, Dispatcher, DispatcherConfig, DispatcherState, LimiterKind, Pending, RateLimiter,
    Transport,
};
pub use http::{HttpConfig, HttpError, HttpTransport, QueuedHttpClient};
pub use posts::{Post, PostsApi, PostsError};
pub use priority::Priority;
pub use queue::{PriorityWeights, QueueError, QueueSnapshot, WeightedPriorityQueue};
