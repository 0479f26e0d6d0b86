//! End-to-end tests for QueuedHttpClient against a local server

mod common;

use std::sync::Arc;
use std::time::Duration;

use ratequeue::{DispatcherConfig, DispatcherState, HttpConfig, HttpError, Priority, QueuedHttpClient};

fn client(rate: u32) -> QueuedHttpClient {
    let config = DispatcherConfig {
        rate_limit_per_sec: rate,
        ..Default::default()
    };
    QueuedHttpClient::new(&HttpConfig::default(), &config).unwrap()
}

#[tokio::test]
async fn test_get_returns_response() {
    let server = common::spawn_server().await;
    let client = client(100);

    let response = client
        .get(&format!("{}/posts/1", server.base_url), Priority::High)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], 1);

    let recorded = server.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].path, "/posts/1");
}

#[tokio::test]
async fn test_non_success_status_is_a_response() {
    let server = common::spawn_server().await;
    let client = client(100);

    let response = client
        .get(&format!("{}/status/503", server.base_url), Priority::Medium)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);
    assert_eq!(client.stats().succeeded, 1);
}

#[tokio::test]
async fn test_verbs_send_method_and_content_type() {
    let server = common::spawn_server().await;
    let client = client(100);
    let url = format!("{}/posts/2", server.base_url);

    client.head(&url, Priority::Low).await.unwrap();
    client
        .post(&format!("{}/posts", server.base_url), "application/json", r#"{"title":"a"}"#, Priority::Low)
        .await
        .unwrap();
    client
        .put(&url, "application/json", r#"{"title":"b"}"#, Priority::Low)
        .await
        .unwrap();
    client.delete(&url, "text/plain", Priority::Low).await.unwrap();

    let recorded = server.recorded();
    let methods: Vec<_> = recorded.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, ["HEAD", "POST", "PUT", "DELETE"]);

    assert_eq!(recorded[1].content_type.as_deref(), Some("application/json"));
    assert_eq!(recorded[1].body, r#"{"title":"a"}"#);
    assert_eq!(recorded[2].content_type.as_deref(), Some("application/json"));
    assert_eq!(recorded[2].body, r#"{"title":"b"}"#);
    assert_eq!(recorded[3].content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn test_streamed_body_arrives_whole() {
    let server = common::spawn_server().await;
    let client = client(100);

    let chunks = futures::stream::iter(vec![
        Ok::<_, std::io::Error>(r#"{"title":"#),
        Ok(r#""streamed"}"#),
    ]);
    let response = client
        .post(
            &format!("{}/posts", server.base_url),
            "application/json",
            reqwest::Body::wrap_stream(chunks),
            Priority::High,
        )
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["title"], "streamed");
    assert_eq!(server.recorded()[0].body, r#"{"title":"streamed"}"#);
}

#[tokio::test]
async fn test_execute_prebuilt_request() {
    let server = common::spawn_server().await;
    let client = client(100);

    let request = client
        .request_builder()
        .get(format!("{}/posts/9", server.base_url))
        .build()
        .unwrap();
    let response = client.execute(request, Priority::Immediate).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_bad_url_is_not_queued() {
    let client = client(100);
    let err = client.post("::not-a-url::", "text/plain", "x", Priority::High).await.unwrap_err();
    assert!(matches!(err, HttpError::RequestBuild(_)));
    assert_eq!(client.stats().submitted, 0);
    assert_eq!(client.queue_snapshot().total, 0);
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(100);
    let err = client.get(&format!("http://{}/", addr), Priority::High).await.unwrap_err();
    assert!(matches!(err, HttpError::Transport(_)));
    assert_eq!(client.stats().failed, 1);
}

#[tokio::test]
async fn test_close_rejects_and_stops() {
    let server = common::spawn_server().await;
    let client = client(100);
    client.close();
    client.close();

    let err = client
        .get(&format!("{}/posts/1", server.base_url), Priority::Immediate)
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Closed));

    tokio::time::timeout(Duration::from_secs(5), client.stopped()).await.unwrap();
    assert_eq!(client.state(), DispatcherState::Stopped);
    assert!(server.recorded().is_empty());
}

#[tokio::test]
async fn test_concurrent_requests_are_paced() {
    let server = common::spawn_server().await;
    let client = Arc::new(client(10));
    let started = std::time::Instant::now();

    let mut handles = Vec::new();
    for i in 0..5 {
        let client = Arc::clone(&client);
        let url = format!("{}/posts/{}", server.base_url, i);
        handles.push(tokio::spawn(async move { client.get(&url, Priority::ALL[i % 4]).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    // Five tokens at 10/s span at least 400ms
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(server.recorded().len(), 5);
    assert_eq!(client.stats().dispatched, 5);
}
