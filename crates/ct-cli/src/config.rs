use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key; empty disables auth.
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub store: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_owned(),
            model: "gpt-4o-mini-2024-07-18".to_owned(),
            api_key_env: "OPENAI_API_KEY".to_owned(),
            timeout_ms: 30_000,
            temperature: 0.2,
            max_output_tokens: 200,
            store: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub interval_ms: u64,
    pub burst: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 300,
            burst: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub required_columns: Vec<String>,
    pub comment_column: String,
    pub themes_json_column: String,
    pub themes_flat_column: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            required_columns: [
                "Key",
                "Favourite Flavour",
                "Least Favourite Flavour",
                "Would Purchase Again (Yes/No)",
                "Comments",
            ]
            .into_iter()
            .map(ToOwned::to_owned)
            .collect(),
            comment_column: "Comments".to_owned(),
            themes_json_column: "Themes (JSON)".to_owned(),
            themes_flat_column: "Themes (flat)".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub min_examples: usize,
    pub max_listed_errors: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_examples: ct_jsonl::DEFAULT_MIN_EXAMPLES,
            max_listed_errors: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
        }
    }
}
