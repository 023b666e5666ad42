use super::*;
use ct_core::core::{build_theme_request, GenerationSettings, InputMessage, ModelId, OutputFormat, Role};

fn settings() -> GenerationSettings {
    GenerationSettings {
        model: ModelId::new("gpt-4o-mini-2024-07-18"),
        temperature: 0.2,
        max_output_tokens: 200,
        store: false,
    }
}

// ---------------------------------------------------------------------------
// build_request_body
// ---------------------------------------------------------------------------

#[test]
fn test_build_request_body_theme_request() {
    let req = build_theme_request(&settings(), "Great taste but too salty");
    let json = build_request_body(&req);

    assert_eq!(json["model"], "gpt-4o-mini-2024-07-18");
    assert_eq!(json["text"]["format"]["type"], "json_object");
    assert_eq!(json["temperature"], 0.2);
    assert_eq!(json["max_output_tokens"], 200);
    assert_eq!(json["store"], false);

    let input = json["input"].as_array().unwrap();
    assert_eq!(input.len(), 2);
    assert_eq!(input[0]["role"], "system");
    assert_eq!(input[0]["content"][0]["type"], "input_text");
    assert_eq!(input[1]["role"], "user");
    assert_eq!(
        input[1]["content"][0]["text"],
        "Comment:\nGreat taste but too salty"
    );
}

#[test]
fn test_build_request_body_plain_text() {
    let req = InferenceRequest {
        model: ModelId::new("gpt-4o-mini"),
        messages: vec![InputMessage::new(Role::User, "Hello")],
        format: OutputFormat::Text,
        temperature: 0.8,
        max_output_tokens: 800,
        store: true,
    };
    let json = build_request_body(&req);

    assert_eq!(json["text"]["format"]["type"], "text");
    assert_eq!(json["store"], true);
    assert_eq!(json["input"].as_array().unwrap().len(), 1);
}

#[test]
fn test_build_request_body_escapes_control_characters() {
    let req = build_theme_request(&settings(), "tab\there \"quoted\" \u{0007}");
    let encoded = build_request_body(&req).to_string();

    let decoded: Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(
        decoded["input"][1]["content"][0]["text"],
        "Comment:\ntab\there \"quoted\" \u{0007}"
    );
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

#[test]
fn test_classify_auth() {
    let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
    let err = classify_status(401, body);
    assert!(matches!(
        err,
        InferenceError::Auth { status: 401, ref message } if message == "Incorrect API key provided"
    ));
}

#[test]
fn test_classify_rate_limited() {
    let body = r#"{"error":{"message":"Rate limit reached"}}"#;
    assert!(matches!(
        classify_status(429, body),
        InferenceError::RateLimited(ref m) if m == "Rate limit reached"
    ));
}

#[test]
fn test_classify_server_error_with_plain_body() {
    let err = classify_status(503, "upstream unavailable\n");
    assert_eq!(err.to_string(), "service returned HTTP 503: upstream unavailable");
}

#[test]
fn test_endpoint_joined() {
    let client = OpenAiResponsesClient::new("http://localhost:9000/", None, 1000).unwrap();
    assert_eq!(client.endpoint(), "http://localhost:9000/v1/responses");
}
