//! Fake posts service for exercising the client end to end

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

pub struct TestServer {
    pub base_url: String,
    pub requests: Log,
}

impl TestServer {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve the fake API on an ephemeral local port:
/// - `GET|HEAD|PUT /posts/{id}` return a post with that id
/// - `POST /posts` echoes the JSON body with `id: 101`
/// - `DELETE /posts/{id}` returns `{}`
/// - `/status/{code}/...` answers with that status
pub async fn spawn_server() -> TestServer {
    let requests: Log = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", any(post_by_id))
        .route("/status/{code}", any(status))
        .route("/status/{code}/{*rest}", any(status))
        .with_state(Arc::clone(&requests));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { base_url, requests }
}

fn record(log: &Log, method: &Method, uri: &Uri, headers: &HeaderMap, body: &str) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    log.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type,
        body: body.to_string(),
    });
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| json!({}))
}

async fn create_post(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    record(&log, &method, &uri, &headers, &body);
    let mut post = json_body(&body);
    post["id"] = json!(101);
    (StatusCode::CREATED, Json(post))
}

async fn post_by_id(
    State(log): State<Log>,
    method: Method,
    Path(id): Path<u64>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    record(&log, &method, &uri, &headers, &body);
    match method {
        Method::DELETE => Json(json!({})),
        Method::PUT => {
            let mut post = json_body(&body);
            post["id"] = json!(id);
            Json(post)
        }
        _ => Json(json!({ "userId": 1, "id": id, "title": format!("post {}", id), "body": "body" })),
    }
}

async fn status(
    State(log): State<Log>,
    method: Method,
    Path(params): Path<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    record(&log, &method, &uri, &headers, &body);
    let code = params
        .get("code")
        .and_then(|c| c.parse().ok())
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(json!({}))).into_response()
}
