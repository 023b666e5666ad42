use std::collections::BTreeSet;

use serde_json::Value;

use crate::core::RecordError;

/// Roles every training conversation must contain at least once.
pub const REQUIRED_ROLES: [&str; 3] = ["system", "user", "assistant"];

// ---------------------------------------------------------------------------
// TrainingRecord: one accepted line of a chat fine-tuning file
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingMessage {
    /// `None` when the entry has no string `role`.
    pub role: Option<String>,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainingRecord {
    pub messages: Vec<TrainingMessage>,
}

/// Result of checking one raw line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Whitespace only; counted neither as valid nor as an error.
    Blank,
    Valid(TrainingRecord),
    Invalid(RecordError),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check one line of a training file. The first failing check wins.
pub fn validate_record(raw_line: &str) -> LineOutcome {
    let line = raw_line.trim();
    if line.is_empty() {
        return LineOutcome::Blank;
    }
    match parse_record(line) {
        Ok(record) => LineOutcome::Valid(record),
        Err(err) => LineOutcome::Invalid(err),
    }
}

fn parse_record(line: &str) -> Result<TrainingRecord, RecordError> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| RecordError::Decode(e.to_string()))?;

    let Some(Value::Array(entries)) = value.get("messages") else {
        return Err(RecordError::MissingMessages);
    };

    let found: BTreeSet<String> = entries
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| match entry.get("role") {
            Some(Value::String(role)) => format!("{role:?}"),
            Some(other) => other.to_string(),
            None => "null".to_owned(),
        })
        .collect();
    let has_all_roles = REQUIRED_ROLES
        .iter()
        .all(|required| found.contains(&format!("{required:?}")));
    if !has_all_roles {
        return Err(RecordError::MissingRoles {
            found: render_role_set(&found),
        });
    }

    let messages = entries
        .iter()
        .map(|entry| {
            let content = entry
                .get("content")
                .and_then(Value::as_str)
                .ok_or(RecordError::NonStringContent)?;
            Ok(TrainingMessage {
                role: entry.get("role").and_then(Value::as_str).map(ToOwned::to_owned),
                content: content.to_owned(),
            })
        })
        .collect::<Result<Vec<_>, RecordError>>()?;

    Ok(TrainingRecord { messages })
}

fn render_role_set(found: &BTreeSet<String>) -> String {
    let joined: Vec<&str> = found.iter().map(String::as_str).collect();
    format!("{{{}}}", joined.join(", "))
}
