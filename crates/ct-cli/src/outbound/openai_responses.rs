use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use ct_core::core::{ApiKey, InferenceClient, InferenceEnvelope, InferenceError, InferenceRequest};
use serde_json::Value;

pub const RESPONSES_PATH: &str = "/v1/responses";

/// Client for the OpenAI Responses API (`POST /v1/responses`).
pub struct OpenAiResponsesClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<ApiKey>,
    timeout_ms: u64,
}

impl OpenAiResponsesClient {
    pub fn new(
        base_url: &str,
        api_key: Option<ApiKey>,
        timeout_ms: u64,
    ) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| InferenceError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), RESPONSES_PATH),
            api_key,
            timeout_ms,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &InferenceRequest) -> Result<InferenceEnvelope, InferenceError> {
        let mut req = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(build_request_body(request).to_string());
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key.as_str());
        }

        let response = req.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        let raw: Value =
            serde_json::from_str(&body).map_err(|e| InferenceError::InvalidEnvelope(e.to_string()))?;
        Ok(InferenceEnvelope::new(raw))
    }

    fn transport_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            InferenceError::Connection(err.to_string())
        }
    }
}

impl InferenceClient for OpenAiResponsesClient {
    fn create_response<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceEnvelope, InferenceError>> + Send + 'a>> {
        Box::pin(self.send(request))
    }
}

// ---------------------------------------------------------------------------
// Wire conversion helpers
// ---------------------------------------------------------------------------

pub fn build_request_body(req: &InferenceRequest) -> Value {
    let input: Vec<Value> = req
        .messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role.as_str(),
                "content": [{"type": "input_text", "text": m.text}],
            })
        })
        .collect();

    serde_json::json!({
        "model": req.model.as_str(),
        "input": input,
        "text": {"format": {"type": req.format.as_str()}},
        "temperature": req.temperature,
        "max_output_tokens": req.max_output_tokens,
        "store": req.store,
    })
}

fn classify_status(status: u16, body: &str) -> InferenceError {
    let message = error_message(body);
    match status {
        401 | 403 => InferenceError::Auth { status, message },
        429 => InferenceError::RateLimited(message),
        _ => InferenceError::HttpStatus {
            status,
            body: message,
        },
    }
}

/// `error.message` from an OpenAI-style error body, else the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(ToOwned::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
mod tests;
