use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::core::{InferenceEnvelope, InferenceError};

// ---------------------------------------------------------------------------
// ThemeFailure: every way theme extraction can fall short
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThemeFailure {
    /// Comment was blank; the service was never called.
    NoComment,
    /// The service call itself failed.
    Api(String),
    /// Reply text was not JSON.
    JsonDecode,
    /// Reply was JSON but had no usable `themes` array.
    WrongSchema,
    /// `themes` was present but every entry was blank.
    NoThemes,
}

impl ThemeFailure {
    /// Placeholder theme recorded in place of real themes.
    pub fn sentinel(&self) -> String {
        match self {
            ThemeFailure::NoComment => "no_comment".to_owned(),
            ThemeFailure::Api(message) => format!("api_error: {message}"),
            ThemeFailure::JsonDecode => "json_decode_error".to_owned(),
            ThemeFailure::WrongSchema => "parse_error_or_wrong_schema".to_owned(),
            ThemeFailure::NoThemes => "no_themes_extracted".to_owned(),
        }
    }
}

impl fmt::Display for ThemeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sentinel())
    }
}

// ---------------------------------------------------------------------------
// ThemeResult: never-empty list of trimmed themes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeResult {
    themes: Vec<String>,
    failure: Option<ThemeFailure>,
}

impl ThemeResult {
    pub fn from_failure(failure: ThemeFailure) -> Self {
        Self {
            themes: vec![failure.sentinel()],
            failure: Some(failure),
        }
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// The failure this result stands in for, if it is a sentinel.
    pub fn failure(&self) -> Option<&ThemeFailure> {
        self.failure.as_ref()
    }

    /// Compact `{"themes":[...]}` form, non-ASCII left unescaped.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "themes": self.themes }).to_string()
    }

    pub fn flat(&self) -> String {
        self.themes.join("; ")
    }
}

// ---------------------------------------------------------------------------
// Fallback ladder: each stage maps its failure to a sentinel and stops
// ---------------------------------------------------------------------------

/// Turn the outcome of one service call into themes.
///
/// Stages run in order: service outcome, reply location, JSON decode, schema
/// check, normalization. The first stage to fail decides the sentinel.
pub fn resolve_reply(
    outcome: Result<InferenceEnvelope, InferenceError>,
) -> Result<ThemeResult, ThemeFailure> {
    let text = locate_reply(outcome)?;
    let value = decode_reply(&text)?;
    let candidates = read_themes(value)?;
    normalize_themes(candidates)
}

fn locate_reply(outcome: Result<InferenceEnvelope, InferenceError>) -> Result<String, ThemeFailure> {
    let envelope = outcome.map_err(|err| ThemeFailure::Api(err.to_string()))?;
    Ok(envelope.reply_text_or_raw())
}

fn decode_reply(text: &str) -> Result<Value, ThemeFailure> {
    serde_json::from_str(text).map_err(|_| ThemeFailure::JsonDecode)
}

fn read_themes(value: Value) -> Result<Vec<String>, ThemeFailure> {
    let Value::Object(mut obj) = value else {
        return Err(ThemeFailure::WrongSchema);
    };
    let Some(Value::Array(items)) = obj.remove("themes") else {
        return Err(ThemeFailure::WrongSchema);
    };

    let mut candidates = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => candidates.push(s),
            Value::Number(n) => candidates.push(n.to_string()),
            Value::Bool(b) => candidates.push(b.to_string()),
            Value::Null => {}
            Value::Array(_) | Value::Object(_) => return Err(ThemeFailure::WrongSchema),
        }
    }
    Ok(candidates)
}

fn normalize_themes(candidates: Vec<String>) -> Result<ThemeResult, ThemeFailure> {
    let themes: Vec<String> = candidates
        .iter()
        .map(|theme| theme.trim())
        .filter(|theme| !theme.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if themes.is_empty() {
        return Err(ThemeFailure::NoThemes);
    }
    Ok(ThemeResult {
        themes,
        failure: None,
    })
}

// ---------------------------------------------------------------------------
// Flattening stored JSON back into a readable cell
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StoredThemes {
    #[serde(default)]
    themes: Vec<String>,
}

/// Join the themes of a stored `{"themes":[...]}` value with `"; "`.
///
/// Anything that does not re-parse yields an empty string.
pub fn flatten_themes_json(json: &str) -> String {
    serde_json::from_str::<StoredThemes>(json)
        .map(|stored| stored.themes.join("; "))
        .unwrap_or_default()
}
