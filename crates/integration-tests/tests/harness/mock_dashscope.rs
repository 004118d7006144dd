//! Mock DashScope backend for integration tests
//!
//! Serves the upload-policy endpoint, an OSS form-upload target and the
//! multimodal generation endpoint from a single local listener.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

const UPLOADS_PATH: &str = "/api/v1/uploads";
const OSS_PATH: &str = "/oss";
const ASR_PATH: &str = "/api/v1/services/aigc/multimodal-generation/generation";

/// Mock DashScope that records what the bridge sent it
pub struct MockDashScope {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    base_url: String,
    policy_status: StatusCode,
    upload_status: StatusCode,
    asr_status: StatusCode,
    asr_delay: Option<Duration>,
    asr_response: Value,

    policy_count: AtomicU32,
    upload_count: AtomicU32,
    asr_count: AtomicU32,

    policy_query: Mutex<Option<(String, String)>>,
    upload_fields: Mutex<Vec<String>>,
    upload_size: Mutex<usize>,
    asr_body: Mutex<Option<Value>>,
    asr_headers: Mutex<Option<HeaderMap>>,
}

/// Failure modes and canned responses for [`MockDashScope`]
pub struct MockDashScopeBuilder {
    policy_status: StatusCode,
    upload_status: StatusCode,
    asr_status: StatusCode,
    asr_delay: Option<Duration>,
    asr_response: Value,
}

impl MockDashScopeBuilder {
    pub fn policy_status(mut self, status: u16) -> Self {
        self.policy_status = StatusCode::from_u16(status).expect("valid status");
        self
    }

    pub fn upload_status(mut self, status: u16) -> Self {
        self.upload_status = StatusCode::from_u16(status).expect("valid status");
        self
    }

    pub fn asr_status(mut self, status: u16) -> Self {
        self.asr_status = StatusCode::from_u16(status).expect("valid status");
        self
    }

    /// Hold every ASR response for `delay`
    pub fn asr_delay(mut self, delay: Duration) -> Self {
        self.asr_delay = Some(delay);
        self
    }

    pub fn asr_response(mut self, response: Value) -> Self {
        self.asr_response = response;
        self
    }

    pub async fn start(self) -> anyhow::Result<MockDashScope> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState {
            base_url: format!("http://{addr}"),
            policy_status: self.policy_status,
            upload_status: self.upload_status,
            asr_status: self.asr_status,
            asr_delay: self.asr_delay,
            asr_response: self.asr_response,
            policy_count: AtomicU32::new(0),
            upload_count: AtomicU32::new(0),
            asr_count: AtomicU32::new(0),
            policy_query: Mutex::new(None),
            upload_fields: Mutex::new(Vec::new()),
            upload_size: Mutex::new(0),
            asr_body: Mutex::new(None),
            asr_headers: Mutex::new(None),
        });

        let app = Router::new()
            .route(UPLOADS_PATH, routing::get(handle_policy))
            .route(OSS_PATH, routing::post(handle_upload))
            .route(ASR_PATH, routing::post(handle_asr))
            .with_state(Arc::clone(&state));

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(MockDashScope { addr, shutdown, state })
    }
}

impl MockDashScope {
    pub fn builder() -> MockDashScopeBuilder {
        MockDashScopeBuilder {
            policy_status: StatusCode::OK,
            upload_status: StatusCode::OK,
            asr_status: StatusCode::OK,
            asr_delay: None,
            asr_response: transcript_response("hello world"),
        }
    }

    /// Mock that answers every call successfully
    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    pub fn upload_endpoint(&self) -> String {
        format!("http://{}{UPLOADS_PATH}", self.addr)
    }

    pub fn asr_endpoint(&self) -> String {
        format!("http://{}{ASR_PATH}", self.addr)
    }

    pub fn policy_count(&self) -> u32 {
        self.state.policy_count.load(Ordering::Relaxed)
    }

    pub fn upload_count(&self) -> u32 {
        self.state.upload_count.load(Ordering::Relaxed)
    }

    pub fn asr_count(&self) -> u32 {
        self.state.asr_count.load(Ordering::Relaxed)
    }

    /// `(action, model)` query of the last policy request
    pub fn policy_query(&self) -> Option<(String, String)> {
        self.state.policy_query.lock().unwrap().clone()
    }

    /// Field names of the last OSS upload, in wire order
    pub fn upload_fields(&self) -> Vec<String> {
        self.state.upload_fields.lock().unwrap().clone()
    }

    /// Byte length of the last uploaded file part
    pub fn upload_size(&self) -> usize {
        *self.state.upload_size.lock().unwrap()
    }

    pub fn asr_body(&self) -> Option<Value> {
        self.state.asr_body.lock().unwrap().clone()
    }

    pub fn asr_header(&self, name: &str) -> Option<String> {
        self.state
            .asr_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|headers| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }
}

impl Drop for MockDashScope {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// ASR response with a single unannotated choice
pub fn transcript_response(text: &str) -> Value {
    json!({
        "output": {
            "choices": [{
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": [{ "text": text }] }
            }]
        },
        "usage": { "output_tokens_details": { "text_tokens": 2 } },
        "request_id": "mock-request-id"
    })
}

/// ASR response carrying a language annotation and usage
pub fn annotated_response(text: &str, language: &str) -> Value {
    json!({
        "output": {
            "choices": [{
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": [{ "text": text }],
                    "annotations": [{ "language": language, "type": "audio_info", "emotion": "neutral" }]
                }
            }]
        },
        "usage": {
            "input_tokens_details": { "text_tokens": 4 },
            "output_tokens_details": { "text_tokens": 3 },
            "seconds": 2
        },
        "request_id": "mock-request-id"
    })
}

async fn handle_policy(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<std::collections::HashMap<String, String>>,
) -> Response {
    state.policy_count.fetch_add(1, Ordering::Relaxed);

    *state.policy_query.lock().unwrap() = Some((
        query.get("action").cloned().unwrap_or_default(),
        query.get("model").cloned().unwrap_or_default(),
    ));

    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, "InvalidApiKey").into_response();
    }

    if state.policy_status != StatusCode::OK {
        return (state.policy_status, "{\"code\":\"AccessDenied\"}").into_response();
    }

    Json(json!({
        "request_id": "policy-request-id",
        "data": {
            "policy": "eyJleHBpcmF0aW9uIjoi",
            "signature": "mock-signature",
            "upload_dir": "dashscope-instant/mock",
            "upload_host": format!("{}{OSS_PATH}", state.base_url),
            "expire_in_seconds": 300,
            "max_file_size_mb": 100,
            "capacity_limit_mb": 999_999_999,
            "oss_access_key_id": "LTAI-mock",
            "x_oss_object_acl": "private",
            "x_oss_forbid_overwrite": "true"
        }
    }))
    .into_response()
}

async fn handle_upload(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    state.upload_count.fetch_add(1, Ordering::Relaxed);

    let mut fields = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "file" {
            let bytes = field.bytes().await.unwrap_or_default();
            *state.upload_size.lock().unwrap() = bytes.len();
        }

        fields.push(name);
    }

    *state.upload_fields.lock().unwrap() = fields;

    if state.upload_status != StatusCode::OK {
        return (state.upload_status, "<Error><Code>AccessDenied</Code></Error>").into_response();
    }

    StatusCode::OK.into_response()
}

async fn handle_asr(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.asr_count.fetch_add(1, Ordering::Relaxed);

    *state.asr_body.lock().unwrap() = Some(body);
    *state.asr_headers.lock().unwrap() = Some(headers);

    if let Some(delay) = state.asr_delay {
        tokio::time::sleep(delay).await;
    }

    if state.asr_status != StatusCode::OK {
        return (state.asr_status, "{\"code\":\"InvalidParameter\"}").into_response();
    }

    Json(state.asr_response.clone()).into_response()
}
