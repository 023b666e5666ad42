#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;

use ct_cli::extractor::ThemeExtractor;
use ct_cli::pipeline::{SheetLayout, ThemeEnrichmentPipeline};
use ct_core::core::{
    GenerationSettings, InferenceClient, InferenceEnvelope, InferenceError, InferenceRequest,
    ModelId, TokenBucket,
};

// ---------------------------------------------------------------------------
// MockInferenceServer: canned Responses API endpoint
// ---------------------------------------------------------------------------

struct MockConfig {
    response_body: String,
    status_code: u16,
    delay_ms: u64,
    requests: Mutex<Vec<serde_json::Value>>,
}

pub struct MockInferenceServer {
    addr: SocketAddr,
    config: Arc<MockConfig>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockInferenceServer {
    pub async fn start(response_body: &str) -> Self {
        Self::start_with_options(response_body, 200, 0).await
    }

    pub async fn start_with_options(response_body: &str, status: u16, delay_ms: u64) -> Self {
        let config = Arc::new(MockConfig {
            response_body: response_body.to_owned(),
            status_code: status,
            delay_ms,
            requests: Mutex::new(Vec::new()),
        });

        let app = axum::Router::new()
            .route("/v1/responses", post(mock_responses_handler))
            .with_state(Arc::clone(&config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            config,
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far, in arrival order.
    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.config.requests.lock().unwrap().clone()
    }
}

impl Drop for MockInferenceServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

async fn mock_responses_handler(State(config): State<Arc<MockConfig>>, body: Bytes) -> Response {
    let parsed = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    config.requests.lock().unwrap().push(parsed);

    if config.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.delay_ms)).await;
    }

    let status =
        StatusCode::from_u16(config.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        config.response_body.clone(),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// ScriptedClient: in-process InferenceClient keyed on the comment text
// ---------------------------------------------------------------------------

pub struct ScriptedClient {
    replies: Vec<(String, Result<String, InferenceError>)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    call_times: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedClient {
    /// `replies` maps a comment to the reply text (or error) it should get.
    /// Unlisted comments get a `500` error.
    pub fn new(replies: Vec<(&str, Result<&str, InferenceError>)>) -> Arc<Self> {
        let replies = replies
            .into_iter()
            .map(|(comment, reply)| (comment.to_owned(), reply.map(ToOwned::to_owned)))
            .collect();
        Arc::new(Self {
            replies,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Comments sent to the service, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    /// When each call arrived, on the tokio clock.
    pub fn call_times(&self) -> Vec<tokio::time::Instant> {
        self.call_times.lock().unwrap().clone()
    }

    fn answer(&self, request: &InferenceRequest) -> Result<InferenceEnvelope, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        let user_text = request
            .messages
            .last()
            .map(|m| m.text.as_str())
            .unwrap_or_default();
        let comment = user_text.strip_prefix("Comment:\n").unwrap_or(user_text);
        self.seen.lock().unwrap().push(comment.to_owned());

        match self.replies.iter().find(|(c, _)| c == comment) {
            Some((_, Ok(text))) => Ok(envelope(text)),
            Some((_, Err(e))) => Err(e.clone()),
            None => Err(InferenceError::HttpStatus {
                status: 500,
                body: "unscripted comment".into(),
            }),
        }
    }
}

impl InferenceClient for ScriptedClient {
    fn create_response<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceEnvelope, InferenceError>> + Send + 'a>> {
        let result = self.answer(request);
        Box::pin(async move { result })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const TEST_MODEL: &str = "gpt-4o-mini-2024-07-18";

pub fn settings() -> GenerationSettings {
    GenerationSettings {
        model: ModelId::new(TEST_MODEL),
        temperature: 0.2,
        max_output_tokens: 200,
        store: false,
    }
}

pub fn layout() -> SheetLayout {
    SheetLayout {
        required_columns: vec!["Key".into(), "Comments".into()],
        comment_column: "Comments".into(),
        themes_json_column: "Themes (JSON)".into(),
        themes_flat_column: "Themes (flat)".into(),
    }
}

/// Pipeline with no pacing delay.
pub fn pipeline(client: Arc<dyn InferenceClient>) -> ThemeEnrichmentPipeline {
    paced_pipeline(client, 0)
}

/// Pipeline allowing one service call per `interval_ms`.
pub fn paced_pipeline(client: Arc<dyn InferenceClient>, interval_ms: u64) -> ThemeEnrichmentPipeline {
    let extractor = ThemeExtractor::new(client, settings(), Duration::from_secs(5));
    ThemeEnrichmentPipeline::new(extractor, TokenBucket::new(interval_ms, 1), layout())
}

/// A Responses API body whose first output text is `text`.
pub fn response_body(text: &str) -> String {
    serde_json::json!({
        "id": "resp_test123",
        "object": "response",
        "model": TEST_MODEL,
        "output": [{
            "type": "message",
            "role": "assistant",
            "content": [{"type": "output_text", "text": text}]
        }]
    })
    .to_string()
}

pub fn envelope(text: &str) -> InferenceEnvelope {
    InferenceEnvelope::new(serde_json::from_str(&response_body(text)).unwrap())
}

pub fn write_csv(path: &Path, rows: &[&[&str]]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for row in rows {
        writer.write_record(*row).unwrap();
    }
    writer.flush().unwrap();
}

pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(ToOwned::to_owned).collect())
        .collect()
}
