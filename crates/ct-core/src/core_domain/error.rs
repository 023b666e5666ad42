// ---------------------------------------------------------------------------
// Inference boundary errors
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("service returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },
    #[error("rate limited by service: {0}")]
    RateLimited(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("response envelope is not valid JSON: {0}")]
    InvalidEnvelope(String),
}

// ---------------------------------------------------------------------------
// Training record errors: one per rejected line, first failing check wins
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("JSON decode error: {0}")]
    Decode(String),
    #[error("missing or invalid 'messages' list")]
    MissingMessages,
    #[error("missing one of required roles, found: {found}")]
    MissingRoles { found: String },
    #[error("non-string content detected")]
    NonStringContent,
}

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingDelay {
    pub wait_ms: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_http_status() {
        let err = InferenceError::HttpStatus {
            status: 500,
            body: "internal error".into(),
        };
        assert_eq!(err.to_string(), "service returned HTTP 500: internal error");
    }

    #[test]
    fn test_display_auth() {
        let err = InferenceError::Auth {
            status: 401,
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(
            err.to_string(),
            "authentication failed (HTTP 401): Incorrect API key provided"
        );
    }

    #[test]
    fn test_display_timeout() {
        let err = InferenceError::Timeout { timeout_ms: 30_000 };
        assert_eq!(err.to_string(), "request timed out after 30000ms");
    }

    #[test]
    fn test_display_rate_limited() {
        let err = InferenceError::RateLimited("slow down".into());
        assert_eq!(err.to_string(), "rate limited by service: slow down");
    }

    #[test]
    fn test_display_record_errors() {
        assert_eq!(
            RecordError::Decode("expected value at line 1 column 1".into()).to_string(),
            "JSON decode error: expected value at line 1 column 1"
        );
        assert_eq!(
            RecordError::MissingMessages.to_string(),
            "missing or invalid 'messages' list"
        );
        assert_eq!(
            RecordError::MissingRoles {
                found: "{\"user\"}".into()
            }
            .to_string(),
            "missing one of required roles, found: {\"user\"}"
        );
        assert_eq!(
            RecordError::NonStringContent.to_string(),
            "non-string content detected"
        );
    }
}
