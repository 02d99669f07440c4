// src/test_utils/mock_gemini_server.rs
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the mock answers to the next `generateContent` call.
#[derive(Debug, Clone)]
pub enum MockGeminiReply {
    Text(String),
    Error { status: u16, message: String },
    /// 200 with a body that is not a Gemini response.
    Garbage,
}

#[derive(Debug, Clone)]
pub struct RecordedGeminiRequest {
    pub model_action: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockServerState {
    replies: Arc<Mutex<VecDeque<MockGeminiReply>>>,
    requests: Arc<Mutex<Vec<RecordedGeminiRequest>>>,
}

async fn generate_content_handler(
    State(state): State<MockServerState>,
    Path(model_action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    log::debug!("Mock Gemini server received request for {}", model_action);
    state.requests.lock().unwrap().push(RecordedGeminiRequest {
        model_action,
        api_key: query.get("key").cloned(),
        body,
    });

    match state.replies.lock().unwrap().pop_front() {
        Some(MockGeminiReply::Text(text)) => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20}
        }))
        .into_response(),
        Some(MockGeminiReply::Error { status, message }) => {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (code, Json(json!({"error": {"code": status, "message": message}}))).into_response()
        }
        Some(MockGeminiReply::Garbage) => (StatusCode::OK, "not json at all").into_response(),
        None => {
            log::error!("Mock Gemini server ran out of replies!");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

pub struct MockGeminiServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    recorded_requests: Arc<Mutex<Vec<RecordedGeminiRequest>>>,
}

impl MockGeminiServer {
    pub async fn start(replies: Vec<MockGeminiReply>) -> Self {
        let state = MockServerState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let recorded_requests = state.requests.clone();

        let app = Router::new()
            .route("/models/{model_action}", post(generate_content_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| log::error!("Mock Gemini server error: {}", e));
        });

        MockGeminiServer {
            addr,
            shutdown_tx,
            recorded_requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get_requests(&self) -> Vec<RecordedGeminiRequest> {
        self.recorded_requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock Gemini server shutdown signal already sent or receiver dropped.");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}
