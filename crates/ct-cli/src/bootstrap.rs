use std::collections::HashSet;

use anyhow::{bail, ensure};
use ct_core::core::{ApiKey, GenerationSettings, ModelId};

use crate::config::AppConfig;
use crate::pipeline::SheetLayout;
use crate::telemetry::LogFormat;

// ---------------------------------------------------------------------------
// RuntimeConfig: fully validated runtime configuration
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub generation: GenerationSettings,
    pub pacing_interval_ms: u64,
    pub pacing_burst: u32,
    pub sheet: SheetLayout,
    pub min_examples: usize,
    pub max_listed_errors: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

// ---------------------------------------------------------------------------
// into_runtime: converts raw AppConfig into validated RuntimeConfig
// ---------------------------------------------------------------------------

pub fn into_runtime(config: AppConfig) -> Result<RuntimeConfig, anyhow::Error> {
    let inference = config.inference;
    let base_url = inference.base_url.trim().trim_end_matches('/').to_owned();
    ensure!(
        base_url.starts_with("http://") || base_url.starts_with("https://"),
        "inference.base_url must be an http(s) URL, got {:?}",
        inference.base_url
    );
    ensure!(!inference.model.trim().is_empty(), "inference.model must not be empty");
    ensure!(inference.timeout_ms > 0, "inference.timeout_ms must be positive");
    ensure!(
        inference.max_output_tokens > 0,
        "inference.max_output_tokens must be positive"
    );
    ensure!(
        (0.0..=2.0).contains(&inference.temperature),
        "inference.temperature must be within 0.0..=2.0, got {}",
        inference.temperature
    );

    ensure!(config.pacing.burst >= 1, "pacing.burst must be at least 1");

    let sheet = config.sheet;
    let mut seen_columns = HashSet::with_capacity(sheet.required_columns.len());
    for column in &sheet.required_columns {
        ensure!(!column.trim().is_empty(), "sheet.required_columns has a blank name");
        ensure!(
            seen_columns.insert(column.as_str()),
            "duplicate required column: {column}"
        );
    }
    ensure!(
        seen_columns.contains(sheet.comment_column.as_str()),
        "sheet.comment_column {:?} must be listed in sheet.required_columns",
        sheet.comment_column
    );
    for output in [&sheet.themes_json_column, &sheet.themes_flat_column] {
        ensure!(!output.trim().is_empty(), "output column names must not be empty");
        ensure!(
            !seen_columns.contains(output.as_str()),
            "output column {output:?} collides with a required input column"
        );
    }
    ensure!(
        sheet.themes_json_column != sheet.themes_flat_column,
        "themes_json_column and themes_flat_column must differ"
    );

    ensure!(
        config.validator.min_examples >= 1,
        "validator.min_examples must be at least 1"
    );

    let log_format = match config.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        other => bail!("logging.format must be \"pretty\" or \"json\", got {other:?}"),
    };

    Ok(RuntimeConfig {
        base_url,
        api_key_env: inference.api_key_env.trim().to_owned(),
        timeout_ms: inference.timeout_ms,
        generation: GenerationSettings {
            model: ModelId::new(inference.model.trim()),
            temperature: inference.temperature,
            max_output_tokens: inference.max_output_tokens,
            store: inference.store,
        },
        pacing_interval_ms: config.pacing.interval_ms,
        pacing_burst: config.pacing.burst,
        sheet: SheetLayout {
            required_columns: sheet.required_columns,
            comment_column: sheet.comment_column,
            themes_json_column: sheet.themes_json_column,
            themes_flat_column: sheet.themes_flat_column,
        },
        min_examples: config.validator.min_examples,
        max_listed_errors: config.validator.max_listed_errors,
        log_level: config.logging.level,
        log_format,
    })
}

/// Look up the API key named by `api_key_env`.
///
/// An empty variable name means the service needs no key. A named variable
/// that is unset or blank is an error.
pub fn resolve_api_key(
    api_key_env: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<ApiKey>, anyhow::Error> {
    if api_key_env.is_empty() {
        return Ok(None);
    }
    match lookup(api_key_env) {
        Some(value) if !value.trim().is_empty() => Ok(Some(ApiKey::new(value.trim()))),
        _ => bail!("environment variable {api_key_env} is not set"),
    }
}
