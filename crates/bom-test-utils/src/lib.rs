//! Shared test utilities for BOM editor tests.
//!
//! - [`FakeSuggester`]: a scripted [`Suggester`] for exercising the editor
//!   and UI without any HTTP.
//! - [`FakeGemini`]: a local axum server that stands in for the Gemini
//!   `generateContent` endpoint. It replays a canned response and records
//!   every request, so the real reqwest client can be tested offline.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use bom_core::suggest::{SuggestError, Suggester, SuggestionRequest};
use bom_core::{Item, ItemDraft, NewItem};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An [`ItemDraft`] as a user would type it.
pub fn draft(component: &str, value: &str, total: &str, pcb: &str) -> ItemDraft {
    ItemDraft {
        component: component.to_string(),
        value: value.to_string(),
        total_quantity: total.to_string(),
        pcb_quantity: pcb.to_string(),
    }
}

pub fn new_item(component: &str, value: &str, total: u32, pcb: u32) -> NewItem {
    NewItem {
        component: component.to_string(),
        value: value.to_string(),
        total_quantity: total,
        pcb_quantity: pcb,
    }
}

/// A small, plausible batch of suggestions.
pub fn sample_suggestions() -> Vec<NewItem> {
    vec![
        new_item("Resistor", "10k", 4, 2),
        new_item("Capacitor", "100nF", 6, 3),
        new_item("LED", "Red", 2, 1),
    ]
}

/// Model output text (a JSON array in the response schema) for `items`.
pub fn suggestion_text(items: &[NewItem]) -> String {
    let array: Vec<Value> = items
        .iter()
        .map(|i| {
            json!({
                "component": i.component,
                "value": i.value,
                "totalQuantity": i.total_quantity,
                "pcbQuantity": i.pcb_quantity,
            })
        })
        .collect();
    Value::Array(array).to_string()
}

/// A `generateContent` response envelope whose only candidate carries `text`.
pub fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// FakeSuggester
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Script {
    Return(Vec<NewItem>),
    FailStatus(u16),
    FailMissingCredential,
}

/// Scripted [`Suggester`] that counts calls and remembers requests.
#[derive(Debug)]
pub struct FakeSuggester {
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SuggestionRequest>>,
}

impl FakeSuggester {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Succeed with `items`, numbered from 1.
    pub fn returning(items: Vec<NewItem>) -> Self {
        Self::with_script(Script::Return(items))
    }

    /// Fail every call with an HTTP status error.
    pub fn failing(status: u16) -> Self {
        Self::with_script(Script::FailStatus(status))
    }

    /// Fail every call as if no API key were configured.
    pub fn missing_credential() -> Self {
        Self::with_script(Script::FailMissingCredential)
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SuggestionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Suggester for FakeSuggester {
    fn name(&self) -> &str {
        "fake"
    }

    async fn suggest(&self, request: &SuggestionRequest) -> Result<Vec<Item>, SuggestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Return(items) => Ok(items
                .iter()
                .cloned()
                .zip(1u32..)
                .map(|(item, serial)| item.into_item(serial))
                .collect()),
            Script::FailStatus(status) => Err(SuggestError::Status {
                status: *status,
                body: "scripted failure".to_string(),
            }),
            Script::FailMissingCredential => Err(SuggestError::MissingCredential),
        }
    }
}

// ---------------------------------------------------------------------------
// FakeGemini
// ---------------------------------------------------------------------------

/// One request received by [`FakeGemini`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body parsed as JSON; panics if it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

struct FakeState {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server answering every request with a fixed response.
pub struct FakeGemini {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeGemini {
    /// Start a server on `127.0.0.1:0` that replies `status` with `body`.
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let state = Arc::new(FakeState {
            status: StatusCode::from_u16(status).expect("valid HTTP status"),
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake Gemini listener");
        let addr = listener.local_addr().expect("listener has an address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Reply 200 with a `generateContent` envelope carrying `text`.
    pub async fn replying_text(text: &str) -> Self {
        Self::start(200, gemini_body(text)).await
    }

    /// Base URL to put in `GeminiConfig::base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for FakeGemini {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record_and_reply(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}
