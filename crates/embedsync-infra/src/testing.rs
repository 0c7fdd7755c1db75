//! Mock embedding provider for tests.
//!
//! Serves `POST /v1/embeddings` on a random local port. Responses are taken
//! from a FIFO queue; when the queue is empty the server either synthesizes
//! embeddings (auto mode) or answers 500.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use tokio::task::JoinHandle;

/// One request as received by the mock server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    /// Parsed JSON body, or `Value::Null` if the body was not JSON.
    pub body: serde_json::Value,
}

#[derive(Default)]
struct MockState {
    queue: Mutex<VecDeque<(u16, String)>>,
    auto_dims: Option<usize>,
    requests: Mutex<Vec<CapturedRequest>>,
}

/// Local HTTP server standing in for an OpenAI-compatible embeddings API.
pub struct MockEmbeddingServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockEmbeddingServer {
    /// Start a server that only answers with queued responses.
    pub async fn start() -> Self {
        Self::start_with_state(MockState::default()).await
    }

    /// Start a server that synthesizes `dims`-wide embeddings for every input
    /// once the queue is empty.
    ///
    /// Input `i` with text `t` gets `[len(t), len(t) + 1, ...]`; total tokens
    /// is the whitespace word count of the batch.
    pub async fn start_auto(dims: usize) -> Self {
        Self::start_with_state(MockState {
            auto_dims: Some(dims),
            ..MockState::default()
        })
        .await
    }

    async fn start_with_state(state: MockState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/v1/embeddings", post(handle_embeddings))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Full endpoint URL to configure the client with.
    pub fn url(&self) -> String {
        format!("http://{}/v1/embeddings", self.addr)
    }

    /// Queue a raw response.
    pub fn queue(&self, status: u16, body: impl Into<String>) {
        self.state
            .queue
            .lock()
            .unwrap()
            .push_back((status, body.into()));
    }

    /// Queue a 200 response carrying `vectors` with indices `0..n` in order.
    pub fn queue_embeddings(&self, vectors: Vec<Vec<f32>>, total_tokens: u64) {
        let items: Vec<(usize, Vec<f32>)> = vectors.into_iter().enumerate().collect();
        self.queue(200, embeddings_body(&items, total_tokens));
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockEmbeddingServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Render a success body with explicit `(index, embedding)` pairs, in the
/// given order.
pub fn embeddings_body(items: &[(usize, Vec<f32>)], total_tokens: u64) -> String {
    let data: Vec<serde_json::Value> = items
        .iter()
        .map(|(index, embedding)| {
            serde_json::json!({"object": "embedding", "index": index, "embedding": embedding})
        })
        .collect();
    serde_json::json!({
        "object": "list",
        "data": data,
        "model": "mock-embedding",
        "usage": {"prompt_tokens": total_tokens, "total_tokens": total_tokens}
    })
    .to_string()
}

fn synthesize(body: &serde_json::Value, dims: usize) -> String {
    let inputs: Vec<&str> = body["input"]
        .as_array()
        .map(|values| values.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    let items: Vec<(usize, Vec<f32>)> = inputs
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let base = text.len() as f32;
            (i, (0..dims).map(|j| base + j as f32).collect())
        })
        .collect();
    let tokens = inputs
        .iter()
        .map(|text| text.split_whitespace().count() as u64)
        .sum();
    embeddings_body(&items, tokens)
}

async fn handle_embeddings(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(CapturedRequest {
        authorization,
        body: body.clone(),
    });

    let queued = state.queue.lock().unwrap().pop_front();
    let (status, payload) = match (queued, state.auto_dims) {
        (Some(response), _) => response,
        (None, Some(dims)) => (200, synthesize(&body, dims)),
        (None, None) => (500, r#"{"error": "no response queued"}"#.to_string()),
    };
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], payload).into_response()
}
