//! Typed wrapper for a JSON "posts" REST API
//!
//! Shaped after the jsonplaceholder service: `GET/PUT/DELETE /posts/{id}` and
//! `POST /posts`. Every call goes through the shared [`QueuedHttpClient`], so
//! it is rate limited and prioritized like any other request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::http::{HttpError, QueuedHttpClient};
use crate::priority::Priority;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// A post as returned by the API. Missing fields take their default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum PostsError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Posts API bound to one base URL
#[derive(Clone)]
pub struct PostsApi {
    client: Arc<QueuedHttpClient>,
    base_url: String,
}

impl PostsApi {
    pub fn new(client: Arc<QueuedHttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "PostsApi::new: called");
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post_url(&self, id: u64) -> String {
        format!("{}/posts/{}", self.base_url, id)
    }

    pub async fn fetch_post(&self, id: u64, priority: Priority) -> Result<Post, PostsError> {
        let url = self.post_url(id);
        info!(id, %priority, "Fetching post");
        let response = self.client.get(&url, priority).await?;
        Self::decode(response, &url).await
    }

    pub async fn create_post(&self, title: &str, body: &str, priority: Priority) -> Result<Post, PostsError> {
        let url = format!("{}/posts", self.base_url);
        info!(title, %priority, "Creating post");
        let payload = json!({ "title": title, "body": body, "userId": 1 });
        let response = self
            .client
            .post(&url, JSON_CONTENT_TYPE, payload.to_string(), priority)
            .await?;
        Self::decode(response, &url).await
    }

    pub async fn update_post(&self, id: u64, title: &str, body: &str, priority: Priority) -> Result<Post, PostsError> {
        let url = self.post_url(id);
        info!(id, title, %priority, "Updating post");
        let payload = json!({ "id": id, "title": title, "body": body, "userId": 1 });
        let response = self
            .client
            .put(&url, JSON_CONTENT_TYPE, payload.to_string(), priority)
            .await?;
        Self::decode(response, &url).await
    }

    /// Delete a post. The API answers with an empty object, so the returned
    /// post is usually all defaults.
    pub async fn delete_post(&self, id: u64, priority: Priority) -> Result<Post, PostsError> {
        let url = self.post_url(id);
        info!(id, %priority, "Deleting post");
        let response = self.client.delete(&url, JSON_CONTENT_TYPE, priority).await?;
        Self::decode(response, &url).await
    }

    async fn decode(response: reqwest::Response, url: &str) -> Result<Post, PostsError> {
        let status = response.status();
        if !status.is_success() {
            warn!(%status, url, "PostsApi::decode: unexpected status");
            return Err(PostsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.json::<Post>().await.map_err(PostsError::Decode)
    }
}
