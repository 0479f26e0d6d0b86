//! Transport seam between the dispatcher and whatever executes requests

use async_trait::async_trait;

/// Executes a single request on behalf of the dispatch loop
///
/// Implementations must not retry or buffer: the dispatcher calls `execute`
/// once per task, serially, and hands the outcome straight to the producer.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Request: Send + 'static;
    type Response: Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute one request
    async fn execute(&self, request: Self::Request) -> Result<Self::Response, Self::Error>;

    /// Short description of a request for log lines
    fn describe(&self, _request: &Self::Request) -> String {
        "request".to_string()
    }
}
