// src/test_utils/mock_playback_server.rs
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone)]
struct PlaybackState {
    pushed: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<VecDeque<String>>>,
    update_status: Arc<Mutex<StatusCode>>,
    health_status: Arc<Mutex<StatusCode>>,
    malformed_prompts: Arc<Mutex<bool>>,
    polls: Arc<AtomicUsize>,
}

async fn update_handler(State(state): State<PlaybackState>, Json(body): Json<Value>) -> Response {
    let status = *state.update_status.lock().unwrap();
    match body.get("code").and_then(Value::as_str) {
        Some(code) if !code.is_empty() => {
            if status == StatusCode::OK {
                state.pushed.lock().unwrap().push(code.to_string());
            }
            (status, Json(json!({"success": status == StatusCode::OK}))).into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "Code is required"}))).into_response(),
    }
}

async fn health_handler(State(state): State<PlaybackState>) -> Response {
    let status = *state.health_status.lock().unwrap();
    (status, Json(json!({"status": "ok"}))).into_response()
}

async fn get_prompt_handler(State(state): State<PlaybackState>) -> Response {
    state.polls.fetch_add(1, Ordering::SeqCst);
    if *state.malformed_prompts.lock().unwrap() {
        return Json(json!({"unexpected": [1, 2, 3]})).into_response();
    }
    match state.prompts.lock().unwrap().pop_front() {
        Some(prompt) => Json(json!({
            "hasPrompt": true,
            "prompt": prompt,
            "timestamp": "2026-01-01T00:00:00.000Z"
        }))
        .into_response(),
        None => Json(json!({"hasPrompt": false})).into_response(),
    }
}

/// In-process stand-in for the playback server's REST surface.
pub struct MockPlaybackServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    state: PlaybackState,
}

impl MockPlaybackServer {
    pub async fn start() -> Self {
        let state = PlaybackState {
            pushed: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(VecDeque::new())),
            update_status: Arc::new(Mutex::new(StatusCode::OK)),
            health_status: Arc::new(Mutex::new(StatusCode::OK)),
            malformed_prompts: Arc::new(Mutex::new(false)),
            polls: Arc::new(AtomicUsize::new(0)),
        };

        let app = Router::new()
            .route("/update", post(update_handler))
            .route("/health", get(health_handler))
            .route("/get-prompt", get(get_prompt_handler))
            .with_state(state.clone());

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
                .unwrap_or_else(|e| log::error!("Mock playback server error: {}", e));
        });

        MockPlaybackServer {
            addr,
            shutdown_tx,
            state,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn enqueue_prompt(&self, prompt: &str) {
        self.state.prompts.lock().unwrap().push_back(prompt.to_string());
    }

    pub fn pending_prompts(&self) -> usize {
        self.state.prompts.lock().unwrap().len()
    }

    pub fn set_update_status(&self, status: u16) {
        *self.state.update_status.lock().unwrap() = StatusCode::from_u16(status).unwrap();
    }

    pub fn set_health_status(&self, status: u16) {
        *self.state.health_status.lock().unwrap() = StatusCode::from_u16(status).unwrap();
    }

    pub fn set_malformed_prompts(&self, malformed: bool) {
        *self.state.malformed_prompts.lock().unwrap() = malformed;
    }

    /// Code accepted through `/update`, in arrival order.
    pub fn pushed_code(&self) -> Vec<String> {
        self.state.pushed.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock playback server shutdown signal already sent or receiver dropped.");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}
