//! PostsApi against a local fake posts service

mod common;

use std::sync::Arc;

use ratequeue::{DispatcherConfig, HttpConfig, Post, PostsApi, PostsError, Priority, QueuedHttpClient};

async fn api() -> (common::TestServer, PostsApi) {
    let server = common::spawn_server().await;
    let config = DispatcherConfig {
        rate_limit_per_sec: 100,
        ..Default::default()
    };
    let client = QueuedHttpClient::new(&HttpConfig::default(), &config).unwrap();
    let api = PostsApi::new(Arc::new(client), server.base_url.clone());
    (server, api)
}

#[tokio::test]
async fn test_fetch_post() {
    let (_server, api) = api().await;
    let post = api.fetch_post(5, Priority::High).await.unwrap();
    assert_eq!(post.id, 5);
    assert_eq!(post.user_id, 1);
    assert_eq!(post.title, "post 5");
}

#[tokio::test]
async fn test_create_post_sends_json() {
    let (server, api) = api().await;
    let post = api.create_post("hello", "world", Priority::Medium).await.unwrap();
    assert_eq!(post.id, 101);
    assert_eq!(post.title, "hello");
    assert_eq!(post.body, "world");

    let recorded = server.recorded();
    assert_eq!(recorded[0].method, "POST");
    assert!(recorded[0].content_type.as_deref().unwrap().starts_with("application/json"));
    let sent: serde_json::Value = serde_json::from_str(&recorded[0].body).unwrap();
    assert_eq!(sent["userId"], 1);
}

#[tokio::test]
async fn test_update_post() {
    let (server, api) = api().await;
    let post = api.update_post(3, "new title", "new body", Priority::Low).await.unwrap();
    assert_eq!(post.id, 3);
    assert_eq!(post.title, "new title");
    assert_eq!(server.recorded()[0].method, "PUT");
}

#[tokio::test]
async fn test_delete_post_returns_empty_post() {
    let (server, api) = api().await;
    let post = api.delete_post(3, Priority::Immediate).await.unwrap();
    assert_eq!(post, Post::default());
    assert_eq!(server.recorded()[0].method, "DELETE");
    assert_eq!(server.recorded()[0].path, "/posts/3");
}

#[tokio::test]
async fn test_error_status() {
    let server = common::spawn_server().await;
    let client = QueuedHttpClient::new(&HttpConfig::default(), &DispatcherConfig::default()).unwrap();
    let api = PostsApi::new(Arc::new(client), format!("{}/status/404", server.base_url));

    // Path becomes /status/404/posts/1 which the server does not know
    let err = api.fetch_post(1, Priority::High).await.unwrap_err();
    assert!(matches!(err, PostsError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_closed_client_surfaces_http_error() {
    let (_server, api) = api().await;
    let client = QueuedHttpClient::new(&HttpConfig::default(), &DispatcherConfig::default()).unwrap();
    client.close();
    let closed = PostsApi::new(Arc::new(client), api.base_url());

    let err = closed.fetch_post(1, Priority::High).await.unwrap_err();
    assert!(matches!(err, PostsError::Http(ratequeue::HttpError::Closed)));
}
