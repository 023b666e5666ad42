use std::fmt;

use serde_json::Value;

// ---------------------------------------------------------------------------
// String-based identity newtypes
// ---------------------------------------------------------------------------

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(ModelId);

// ---------------------------------------------------------------------------
// ApiKey: secret value object with redacted Debug
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        if prefix.chars().count() == 6 {
            write!(f, "ApiKey({prefix}...)")
        } else {
            write!(f, "ApiKey(***)")
        }
    }
}

// ---------------------------------------------------------------------------
// Inference request: what the core asks the text-generation service for
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputMessage {
    pub role: Role,
    pub text: String,
}

impl InputMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    JsonObject,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::JsonObject => "json_object",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InferenceRequest {
    pub model: ModelId,
    pub messages: Vec<InputMessage>,
    pub format: OutputFormat,
    pub temperature: f64,
    pub max_output_tokens: u32,
    /// Whether the service may retain this call.
    pub store: bool,
}

// ---------------------------------------------------------------------------
// InferenceEnvelope: raw service response, reply text located lazily
// ---------------------------------------------------------------------------

const REPLY_TEXT_POINTER: &str = "/output/0/content/0/text";

#[derive(Clone, Debug, PartialEq)]
pub struct InferenceEnvelope(Value);

impl InferenceEnvelope {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Generated text at its documented position, if the envelope has one.
    pub fn reply_text(&self) -> Option<&str> {
        self.0.pointer(REPLY_TEXT_POINTER).and_then(Value::as_str)
    }

    /// Reply text, or the whole envelope serialized when the reply is not
    /// where it is expected.
    pub fn reply_text_or_raw(&self) -> String {
        match self.reply_text() {
            Some(text) => text.to_owned(),
            None => self.0.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_redacted_debug() {
        let key = ApiKey::new("sk-proj-abcdef1234567890");
        let debug = format!("{key:?}");
        assert_eq!(debug, "ApiKey(sk-pro...)");
        assert!(!debug.contains("abcdef1234567890"));

        let short_key = ApiKey::new("short");
        assert_eq!(format!("{short_key:?}"), "ApiKey(***)");
    }

    #[test]
    fn test_reply_text_found() {
        let envelope = InferenceEnvelope::new(serde_json::json!({
            "id": "resp_1",
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": "{\"themes\":[\"Price\"]}"}]
            }]
        }));

        assert_eq!(envelope.reply_text(), Some("{\"themes\":[\"Price\"]}"));
        assert_eq!(envelope.reply_text_or_raw(), "{\"themes\":[\"Price\"]}");
    }

    #[test]
    fn test_reply_text_missing_falls_back_to_raw() {
        let raw = serde_json::json!({"id": "resp_1", "output": []});
        let envelope = InferenceEnvelope::new(raw.clone());

        assert!(envelope.reply_text().is_none());
        assert_eq!(envelope.reply_text_or_raw(), raw.to_string());
    }

    #[test]
    fn test_reply_text_non_string_is_missing() {
        let envelope = InferenceEnvelope::new(serde_json::json!({
            "output": [{"content": [{"text": 42}]}]
        }));
        assert!(envelope.reply_text().is_none());
    }

    #[test]
    fn test_role_and_format_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(OutputFormat::Text.as_str(), "text");
        assert_eq!(OutputFormat::JsonObject.as_str(), "json_object");
        assert_eq!(ModelId::new("gpt-4o-mini").to_string(), "gpt-4o-mini");
    }
}
