//! Mock assistants API for testing.
//!
//! Shared with the client crate's end-to-end tests through `#[path]`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub beta: Option<String>,
    pub body: Option<Value>,
}

/// Scripted behavior. Defaults describe a healthy upstream.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Statuses returned by successive run polls; `completed` once drained.
    pub run_statuses: VecDeque<String>,
    /// Assistant reply listed after completion; `None` lists only the user message.
    pub reply_text: Option<String>,
    /// Error returned when starting a run.
    pub run_start_error: Option<(u16, Value)>,
    /// Non-JSON body returned when creating a thread.
    pub thread_raw_body: Option<String>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            run_statuses: VecDeque::new(),
            reply_text: Some("Try **Se7en**.".to_string()),
            run_start_error: None,
            thread_raw_body: None,
        }
    }
}

#[derive(Clone)]
struct MockState {
    behavior: Arc<Mutex<MockBehavior>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        Self::with_behavior(MockBehavior::default()).await
    }

    pub async fn with_behavior(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            behavior: Arc::new(Mutex::new(behavior)),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/threads", post(create_thread))
            .route(
                "/v1/threads/{thread_id}/messages",
                post(create_message).get(list_messages),
            )
            .route("/v1/threads/{thread_id}/runs", post(create_run))
            .route("/v1/threads/{thread_id}/runs/{run_id}", get(get_run))
            .fallback(not_found)
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            requests,
            _handle: handle,
        }
    }

    /// API root as the proxy should be configured with.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .count()
    }
}

fn record(state: &MockState, method: Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        authorization: header("authorization"),
        beta: header("openai-beta"),
        body: serde_json::from_slice(body).ok(),
    });
}

async fn create_thread(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);
    let raw = state.behavior.lock().unwrap().thread_raw_body.clone();
    if let Some(raw) = raw {
        return (StatusCode::BAD_GATEWAY, raw).into_response();
    }
    Json(json!({ "id": "thread_test", "object": "thread", "created_at": 1_700_000_000 }))
        .into_response()
}

async fn create_message(
    State(state): State<MockState>,
    Path(thread_id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);
    let content = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v["content"].as_str().map(str::to_string))
        .unwrap_or_default();
    Json(json!({
        "id": "msg_user_1",
        "object": "thread.message",
        "thread_id": thread_id,
        "role": "user",
        "content": [{ "type": "text", "text": { "value": content, "annotations": [] } }],
        "created_at": 1_700_000_001
    }))
    .into_response()
}

async fn list_messages(
    State(state): State<MockState>,
    Path(thread_id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);
    let reply = state.behavior.lock().unwrap().reply_text.clone();

    let mut data = Vec::new();
    if let Some(text) = reply {
        data.push(json!({
            "id": "msg_assistant_1",
            "object": "thread.message",
            "thread_id": thread_id,
            "role": "assistant",
            "content": [{ "type": "text", "text": { "value": text, "annotations": [] } }],
            "created_at": 1_700_000_003
        }));
    }
    data.push(json!({
        "id": "msg_user_1",
        "object": "thread.message",
        "thread_id": thread_id,
        "role": "user",
        "content": [{ "type": "text", "text": { "value": "question", "annotations": [] } }],
        "created_at": 1_700_000_001
    }));

    Json(json!({ "object": "list", "data": data })).into_response()
}

async fn create_run(
    State(state): State<MockState>,
    Path(thread_id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);
    let failure = state.behavior.lock().unwrap().run_start_error.clone();
    if let Some((status, body)) = failure {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(body)).into_response();
    }
    Json(json!({
        "id": "run_test",
        "object": "thread.run",
        "thread_id": thread_id,
        "status": "queued"
    }))
    .into_response()
}

async fn get_run(
    State(state): State<MockState>,
    Path((thread_id, run_id)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, method, &uri, &headers, &body);
    let status = state
        .behavior
        .lock()
        .unwrap()
        .run_statuses
        .pop_front()
        .unwrap_or_else(|| "completed".to_string());
    Json(json!({
        "id": run_id,
        "object": "thread.run",
        "thread_id": thread_id,
        "status": status
    }))
    .into_response()
}

async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "message": format!("No route for {}", uri.path()) } })),
    )
        .into_response()
}
