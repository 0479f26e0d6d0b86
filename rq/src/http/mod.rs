//! HTTP client built on the dispatcher
//!
//! [`QueuedHttpClient`] offers the usual verbs, each taking a [`Priority`](crate::Priority).
//! Requests are executed by [`HttpTransport`] at the configured rate.

mod client;
mod config;
mod error;
mod transport;

pub use client::QueuedHttpClient;
pub use config::HttpConfig;
pub use error::HttpError;
pub use transport::HttpTransport;
