use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use ct_cli::bootstrap::{self, RuntimeConfig};
use ct_cli::config::AppConfig;
use ct_cli::extractor::ThemeExtractor;
use ct_cli::outbound::OpenAiResponsesClient;
use ct_cli::pipeline::ThemeEnrichmentPipeline;
use ct_cli::{report, telemetry};
use ct_core::core::{build_text_request, GenerationSettings, InferenceClient, TokenBucket};
use ct_jsonl::Recommendation;

#[derive(Parser)]
#[command(name = "ct", about = "Theme survey comments and check fine-tuning files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract themes for every comment in a spreadsheet.
    Themes {
        /// Input spreadsheet (.xlsx, .xls, .ods or .csv).
        #[arg(short, long)]
        input: PathBuf,
        /// Output spreadsheet (.xlsx or .csv), overwritten if present.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Check a JSONL fine-tuning file before upload.
    CheckJsonl {
        file: PathBuf,
        /// Exit with status 2 unless the file passes.
        #[arg(long)]
        strict: bool,
    },
    /// Send one prompt and print the reply.
    Ask {
        prompt: String,
        #[arg(long)]
        system: Option<String>,
        #[arg(long, default_value_t = 0.8)]
        temperature: f64,
        #[arg(long, default_value_t = 800)]
        max_output_tokens: u32,
    },
    /// Validate configuration file and exit.
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match load_runtime(cli.config.as_deref()) {
        Ok(runtime) => runtime,
        Err(e) => return fail(&format!("Config invalid: {e:#}")),
    };
    telemetry::init(&runtime.log_level, runtime.log_format);

    let result = match cli.command {
        Command::Validate => {
            match cli.config.as_deref() {
                Some(path) => println!("Config valid: {}", path.display()),
                None => println!("No config file given; defaults are valid."),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckJsonl { file, strict } => run_check_jsonl(&runtime, &file, strict),
        Command::Themes { input, output } => run_themes(&runtime, &input, &output).await,
        Command::Ask {
            prompt,
            system,
            temperature,
            max_output_tokens,
        } => {
            let settings = GenerationSettings {
                temperature,
                max_output_tokens,
                ..runtime.generation.clone()
            };
            run_ask(&runtime, &settings, system.as_deref(), &prompt).await
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => fail(&format!("{e:#}")),
    }
}

fn load_runtime(path: Option<&Path>) -> Result<RuntimeConfig, anyhow::Error> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => AppConfig::default(),
    };
    bootstrap::into_runtime(config)
}

fn fail(message: &str) -> ExitCode {
    eprintln!("{}", message.red());
    ExitCode::FAILURE
}

fn build_client(runtime: &RuntimeConfig) -> Result<Arc<dyn InferenceClient>, anyhow::Error> {
    let api_key = bootstrap::resolve_api_key(&runtime.api_key_env, |name| std::env::var(name).ok())?;
    let client = OpenAiResponsesClient::new(&runtime.base_url, api_key, runtime.timeout_ms)?;
    Ok(Arc::new(client))
}

fn run_check_jsonl(
    runtime: &RuntimeConfig,
    file: &Path,
    strict: bool,
) -> Result<ExitCode, anyhow::Error> {
    let report = ct_jsonl::validate_file(file)?;
    report::print_validation_report(&report, runtime.min_examples, runtime.max_listed_errors);

    let passes = report.recommendation(runtime.min_examples) == Recommendation::Passes;
    if strict && !passes {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_themes(
    runtime: &RuntimeConfig,
    input: &Path,
    output: &Path,
) -> Result<ExitCode, anyhow::Error> {
    report::run_started();
    let extractor = ThemeExtractor::new(
        build_client(runtime)?,
        runtime.generation.clone(),
        Duration::from_millis(runtime.timeout_ms),
    );
    let pacer = TokenBucket::new(runtime.pacing_interval_ms, runtime.pacing_burst);
    let mut pipeline = ThemeEnrichmentPipeline::new(extractor, pacer, runtime.sheet.clone());

    let summary = pipeline.run(input, output).await?;
    report::run_finished(&summary);
    Ok(ExitCode::SUCCESS)
}

async fn run_ask(
    runtime: &RuntimeConfig,
    settings: &GenerationSettings,
    system: Option<&str>,
    prompt: &str,
) -> Result<ExitCode, anyhow::Error> {
    let client = build_client(runtime)?;
    let request = build_text_request(settings, system, prompt);

    let envelope = client.create_response(&request).await?;
    println!("{}", "Call completed.".bright_green());
    println!();
    println!("{}", envelope.reply_text_or_raw());
    Ok(ExitCode::SUCCESS)
}
