//! Rate-limited HTTP client

use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Client, Request, RequestBuilder, Response};
use tracing::{debug, info};

use crate::dispatcher::{DispatchStats, Dispatcher, DispatcherConfig, DispatcherState, Pending};
use crate::priority::Priority;
use crate::queue::QueueSnapshot;

use super::config::HttpConfig;
use super::error::HttpError;
use super::transport::HttpTransport;

/// HTTP client whose requests all pass through one weighted queue and one
/// rate limiter
///
/// Each verb builds its request up front, so malformed URLs fail before
/// anything is queued. The returned future resolves once the dispatch loop
/// has executed the request. Non-2xx statuses are returned as responses.
pub struct QueuedHttpClient {
    http: Client,
    dispatcher: Dispatcher<HttpTransport>,
}

impl QueuedHttpClient {
    /// Build the transport from `http_config` and start the dispatch loop
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(http_config: &HttpConfig, dispatcher_config: &DispatcherConfig) -> Result<Self, HttpError> {
        debug!(?http_config, ?dispatcher_config, "QueuedHttpClient::new: called");
        let transport = HttpTransport::from_config(http_config)?;
        Self::with_transport(transport, dispatcher_config)
    }

    /// Start the dispatch loop around an existing transport
    pub fn with_transport(transport: HttpTransport, dispatcher_config: &DispatcherConfig) -> Result<Self, HttpError> {
        let http = transport.client().clone();
        let dispatcher = Dispatcher::start(dispatcher_config, transport)?;
        info!(
            rate = dispatcher_config.rate_limit_per_sec,
            "QueuedHttpClient::with_transport: dispatcher started"
        );
        Ok(Self { http, dispatcher })
    }

    pub async fn get(&self, url: &str, priority: Priority) -> Result<Response, HttpError> {
        let request = Self::build(self.http.get(url))?;
        self.execute(request, priority).await
    }

    pub async fn head(&self, url: &str, priority: Priority) -> Result<Response, HttpError> {
        let request = Self::build(self.http.head(url))?;
        self.execute(request, priority).await
    }

    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Body>,
        priority: Priority,
    ) -> Result<Response, HttpError> {
        let request = Self::build(self.http.post(url).header(CONTENT_TYPE, content_type).body(body))?;
        self.execute(request, priority).await
    }

    pub async fn put(
        &self,
        url: &str,
        content_type: &str,
        body: impl Into<Body>,
        priority: Priority,
    ) -> Result<Response, HttpError> {
        let request = Self::build(self.http.put(url).header(CONTENT_TYPE, content_type).body(body))?;
        self.execute(request, priority).await
    }

    pub async fn delete(&self, url: &str, content_type: &str, priority: Priority) -> Result<Response, HttpError> {
        let request = Self::build(self.http.delete(url).header(CONTENT_TYPE, content_type))?;
        self.execute(request, priority).await
    }

    /// Queue a caller-built request and wait for its response
    pub async fn execute(&self, request: Request, priority: Priority) -> Result<Response, HttpError> {
        debug!(method = %request.method(), url = %request.url(), %priority, "QueuedHttpClient::execute: called");
        Ok(self.dispatcher.submit(request, priority).await?)
    }

    /// Queue a request without waiting; the handle resolves to its response
    pub fn enqueue(&self, request: Request, priority: Priority) -> Result<Pending<HttpTransport>, HttpError> {
        Ok(self.dispatcher.enqueue(request, priority)?)
    }

    /// Client used to build requests for [`Self::execute`] and [`Self::enqueue`]
    pub fn request_builder(&self) -> &Client {
        &self.http
    }

    fn build(builder: RequestBuilder) -> Result<Request, HttpError> {
        builder.build().map_err(HttpError::RequestBuild)
    }

    /// Stop accepting requests and stop the dispatch loop. Idempotent.
    pub fn close(&self) {
        info!("QueuedHttpClient::close: called");
        self.dispatcher.close();
    }

    pub fn is_closed(&self) -> bool {
        self.dispatcher.is_closed()
    }

    pub fn state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    /// Resolves once the dispatch loop has exited
    pub async fn stopped(&self) {
        self.dispatcher.stopped().await
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        self.dispatcher.queue_snapshot()
    }
}
