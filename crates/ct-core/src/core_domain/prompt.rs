use crate::core::{InferenceRequest, InputMessage, ModelId, OutputFormat, Role};

/// Upper bound on words per theme, stated to the model in the instruction.
pub const MAX_WORDS_PER_THEME: usize = 4;

pub const THEME_SYSTEM_PROMPT: &str = "You are a market research assistant. \
Extract 2 to 5 short, high-level themes from the consumer comment below. \
Use British English and concise wording. \
Return ONLY valid JSON in this exact schema:\n\
{\n  \"themes\": [\"<theme1>\", \"<theme2>\", \"...\"]\n}\n\
Do not add explanations or any extra text. Keep each theme under 4 words.";

#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub model: ModelId,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub store: bool,
}

/// Two-message instruction asking for a JSON object of themes.
pub fn build_theme_request(settings: &GenerationSettings, comment: &str) -> InferenceRequest {
    InferenceRequest {
        model: settings.model.clone(),
        messages: vec![
            InputMessage::new(Role::System, THEME_SYSTEM_PROMPT),
            InputMessage::new(Role::User, format!("Comment:\n{comment}")),
        ],
        format: OutputFormat::JsonObject,
        temperature: settings.temperature,
        max_output_tokens: settings.max_output_tokens,
        store: settings.store,
    }
}

/// Plain-text request with an optional system instruction.
pub fn build_text_request(
    settings: &GenerationSettings,
    system: Option<&str>,
    prompt: &str,
) -> InferenceRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system.map(str::trim).filter(|s| !s.is_empty()) {
        messages.push(InputMessage::new(Role::System, system));
    }
    messages.push(InputMessage::new(Role::User, prompt));

    InferenceRequest {
        model: settings.model.clone(),
        messages,
        format: OutputFormat::Text,
        temperature: settings.temperature,
        max_output_tokens: settings.max_output_tokens,
        store: settings.store,
    }
}
