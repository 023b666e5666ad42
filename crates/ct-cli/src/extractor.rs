use std::sync::Arc;
use std::time::Duration;

use ct_core::core::{
    build_theme_request, resolve_reply, GenerationSettings, InferenceClient, InferenceError,
    ThemeFailure, ThemeResult,
};

/// Comment in, themes out, whatever the service does.
pub struct ThemeExtractor {
    client: Arc<dyn InferenceClient>,
    settings: GenerationSettings,
    timeout: Duration,
}

impl ThemeExtractor {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            settings,
            timeout,
        }
    }

    /// Always returns a non-empty result; failures come back as sentinels.
    pub async fn extract(&self, comment: &str) -> ThemeResult {
        let request = build_theme_request(&self.settings, comment);

        let outcome = match tokio::time::timeout(self.timeout, self.client.create_response(&request))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(InferenceError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        match resolve_reply(outcome) {
            Ok(result) => {
                tracing::debug!(themes = ?result.themes(), "themes extracted");
                result
            }
            Err(failure) => {
                log_failure(&failure);
                ThemeResult::from_failure(failure)
            }
        }
    }
}

fn log_failure(failure: &ThemeFailure) {
    match failure {
        ThemeFailure::Api(message) => tracing::warn!(error = %message, "theme request failed"),
        other => tracing::warn!(sentinel = %other, "unusable theme reply"),
    }
}
