//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use tracing::debug;

use crate::dispatcher::Transport;

use super::config::HttpConfig;
use super::error::HttpError;

/// Executes requests with a shared `reqwest::Client`
///
/// Non-2xx statuses come back as ordinary responses; only connection,
/// timeout and protocol failures are errors.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the configured timeout and user agent
    pub fn from_config(config: &HttpConfig) -> Result<Self, HttpError> {
        debug!(?config, "HttpTransport::from_config: called");
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(HttpError::Client)?;
        Ok(Self::new(client))
    }

    /// The underlying client, for building requests
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Request = Request;
    type Response = Response;
    type Error = reqwest::Error;

    async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
        self.client.execute(request).await
    }

    fn describe(&self, request: &Request) -> String {
        format!("{} {}", request.method(), request.url())
    }
}
