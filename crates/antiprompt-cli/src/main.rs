//! antiprompt
//!
//! Turns the negative prompt of an image generator into positive terms
//! appended to the positive prompt, optionally preparing a payload for an
//! external language model.

use anyhow::{Context, Result};
use antiprompt_core::{Complexity, InversionOutput, InversionRequest, SystemPromptChoice};
use antiprompt_engine::Inverter;
use antiprompt_lexicon::MaskFiller;
use antiprompt_mask_bert::BertMaskFiller;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

mod config;

use config::{default_config_path, AppConfig};

/// Printed between the modified prompt and the escalation payload
const PAYLOAD_SEPARATOR: &str = "---";

/// Exit status for a run rejected because of its own input
const INPUT_ERROR_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "antiprompt")]
#[command(about = "Invert a negative image prompt into positive terms", long_about = None)]
struct Cli {
    /// Positive prompt the opposites are appended to
    #[arg(short, long, default_value = "")]
    positive: String,

    /// Comma-separated negative prompt
    #[arg(short, long)]
    negative: String,

    /// Weight of the inversion, reported as antonym strength
    #[arg(short, long, default_value_t = 0.5)]
    strength: f32,

    /// Prompt assembly tier: basic, advanced or expert
    #[arg(long, default_value = "basic")]
    complexity: Complexity,

    /// Canned system prompt for escalation: default, prompt_1 or prompt_2
    #[arg(long, default_value = "default")]
    system_prompt: SystemPromptChoice,

    /// File of `word:antonym` lines taking priority over every other source
    #[arg(long)]
    custom_antonyms: Option<PathBuf>,

    /// Enrich antonyms with related terms from ConceptNet
    #[arg(long)]
    conceptnet: bool,

    /// Hand the whole negative prompt to the external model
    #[arg(long)]
    llm_full: bool,

    /// Hand only the unresolved tags to the external model
    #[arg(long)]
    llm_fallback: bool,

    /// System prompt replacing the canned one
    #[arg(long, conflicts_with = "custom_system_prompt_file")]
    custom_system_prompt: Option<String>,

    /// File holding the system prompt replacing the canned one
    #[arg(long)]
    custom_system_prompt_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load the masked language model
    #[arg(long)]
    model: bool,

    /// Local model directory (implies --model)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Inference device: cpu, cuda or metal
    #[arg(long)]
    device: Option<String>,

    /// Fill-mask candidates considered per word
    #[arg(long)]
    top_k: Option<usize>,

    /// Print the full run output as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = AppConfig::load(&config_path, &cli)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;
    info!("Configuration loaded from {}", config_path.display());

    let filler = load_mask_filler(&config).await?;
    let inverter = Inverter::from_config(&config.lexicon, filler)?;

    let request = build_request(&cli)?;
    let output = match inverter.run(&request).await {
        Ok(output) => output,
        Err(e) => match input_error_exit(&e) {
            Some(code) => {
                eprintln!("error: {}", e);
                return Ok(ExitCode::from(code));
            }
            None => return Err(e.into()),
        },
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text(&output));
    }

    Ok(ExitCode::SUCCESS)
}

/// Input mistakes get a plain message and their own exit status instead of
/// an error chain
fn input_error_exit(err: &antiprompt_core::Error) -> Option<u8> {
    err.is_user_input().then_some(INPUT_ERROR_EXIT)
}

/// The masked model is optional; loading it may download weights, so it
/// runs off the async workers.
async fn load_mask_filler(config: &AppConfig) -> Result<Option<Arc<dyn MaskFiller>>> {
    if !config.model.enabled {
        info!("Masked model disabled");
        return Ok(None);
    }

    let settings = config.model.clone();
    let mask_token = config.lexicon.mask.mask_token.clone();
    let filler = tokio::task::spawn_blocking(move || BertMaskFiller::load(&settings, &mask_token))
        .await
        .context("Model loading task failed")??;

    let filler: Arc<dyn MaskFiller> = Arc::new(filler);
    Ok(Some(filler))
}

fn build_request(cli: &Cli) -> Result<InversionRequest> {
    let mut request = InversionRequest::new(&cli.positive, &cli.negative)
        .with_strength(cli.strength)
        .with_complexity(cli.complexity)
        .with_system_prompt(cli.system_prompt)
        .with_conceptnet(cli.conceptnet)
        .with_llm_full(cli.llm_full)
        .with_llm_fallback(cli.llm_fallback);

    if let Some(path) = &cli.custom_antonyms {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read custom antonyms {}", path.display()))?;
        request = request.with_custom_antonyms(text);
    }

    if let Some(prompt) = &cli.custom_system_prompt {
        request = request.with_custom_system_prompt(prompt.clone());
    } else if let Some(path) = &cli.custom_system_prompt_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt {}", path.display()))?;
        request = request.with_custom_system_prompt(text);
    }

    Ok(request)
}

/// Modified prompt, then the escalation payload after a separator when
/// there is one
fn render_text(output: &InversionOutput) -> String {
    if output.llm_input.is_empty() {
        format!("{}\n", output.modified_prompt)
    } else {
        format!(
            "{}\n{}\n{}\n",
            output.modified_prompt, PAYLOAD_SEPARATOR, output.llm_input
        )
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("antiprompt=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("antiprompt=info"))
    };

    // stdout carries the prompt
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
