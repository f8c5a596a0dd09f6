//! CLI command definitions for humaneval-forge.
//!
//! Two commands, one per run mode. Both load the problem set, run the
//! pipeline against the DeepSeek endpoint and write a JSONL samples file.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::collectors::{HumanEvalLoader, DEFAULT_PROBLEM_FILE};
use crate::export::JsonlSink;
use crate::llm::{ClientConfig, CompletionClient};
use crate::pipeline::{PipelineConfig, PipelineOrchestrator, RunMode, RunSummary};

/// Generate HumanEval samples with an LLM, directly or tests-first.
#[derive(Parser)]
#[command(name = "humaneval-forge")]
#[command(about = "Generate HumanEval completions and test suites with an LLM")]
#[command(version)]
#[command(
    long_about = "humaneval-forge asks a chat model to solve every HumanEval problem and writes the results as JSONL for grading.\n\nExample usage:\n  humaneval-forge auto --problems data/HumanEval.jsonl.gz --output samples_auto.jsonl"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Complete each problem with a single prompt.
    Direct(DirectArgs),

    /// Generate tests for each problem, then a solution that passes them.
    #[command(alias = "test-first")]
    Auto(AutoArgs),
}

/// Options shared by both run modes.
#[derive(Parser, Debug)]
pub struct CommonArgs {
    /// HumanEval problem file (JSONL, optionally gzip-compressed).
    #[arg(short = 'p', long, default_value = DEFAULT_PROBLEM_FILE)]
    pub problems: String,

    /// Output JSONL file. Defaults to samples_direct.jsonl / samples_auto.jsonl.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// DeepSeek API key (can also be set via DEEPSEEK_API_KEY env var).
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum tokens generated per request [default: 1024, or PIPELINE_MAX_TOKENS].
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature [default: 0.0, or PIPELINE_TEMPERATURE].
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Only run these task ids (comma-separated), e.g. to rerun failures.
    #[arg(long)]
    pub task_ids: Option<String>,

    /// Only run the first N problems.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output a JSON run summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `humaneval-forge direct`.
#[derive(Parser, Debug)]
pub struct DirectArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for `humaneval-forge auto`.
#[derive(Parser, Debug)]
pub struct AutoArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Attempts per request before a task is abandoned [default: 3, or PIPELINE_MAX_ATTEMPTS].
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Direct(args) => {
            let config =
                apply_overrides(PipelineConfig::from_env(RunMode::Direct)?, &args.common, None);
            run_generation(args.common, config).await?;
        }
        Commands::Auto(args) => {
            let config = apply_overrides(
                PipelineConfig::from_env(RunMode::TestFirst)?,
                &args.common,
                args.max_attempts,
            );
            run_generation(args.common, config).await?;
        }
    }
    Ok(())
}

/// Apply the flags that were given on top of the environment-derived config.
fn apply_overrides(
    mut config: PipelineConfig,
    args: &CommonArgs,
    max_attempts: Option<u32>,
) -> PipelineConfig {
    if let Some(max_tokens) = args.max_tokens {
        config = config.with_max_tokens(max_tokens);
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }
    if let Some(max_attempts) = max_attempts {
        config = config.with_max_attempts(max_attempts);
    }
    config
}

#[derive(Debug, Serialize)]
struct RunOutput {
    #[serde(flatten)]
    summary: RunSummary,
    samples: usize,
    output: String,
    failed_task_ids: Vec<String>,
}

async fn run_generation(args: CommonArgs, config: PipelineConfig) -> anyhow::Result<()> {
    // The secret is checked before any problem is touched.
    let client_config = ClientConfig::resolve(args.api_key).map_err(|e| {
        anyhow::anyhow!(
            "{}. Please provide --api-key or set the DEEPSEEK_API_KEY env var.",
            e
        )
    })?;
    info!(
        model = client_config.model(),
        api_key = %client_config.api_key_masked(),
        "Using DeepSeek chat completions"
    );
    let client = Arc::new(CompletionClient::new(client_config)?);

    let mut problems = HumanEvalLoader::new(&args.problems).load()?;
    if let Some(raw) = args.task_ids.as_deref() {
        let ids = parse_task_ids(raw);
        if !ids.is_empty() {
            problems.retain_ids(&ids)?;
        }
    }
    if let Some(limit) = args.limit {
        problems.truncate(limit);
    }

    let mode = config.mode;
    let output_path = args
        .output
        .unwrap_or_else(|| mode.default_output_file().to_string());

    let orchestrator = PipelineOrchestrator::new(client, config)?;
    let mut sink = JsonlSink::new(&output_path);
    let (report, outcome) = orchestrator.run_to_sink(&problems, &mut sink).await?;

    if args.json {
        let output = RunOutput {
            summary: report.summary(),
            samples: outcome.records,
            output: outcome.location,
            failed_task_ids: report.failed_task_ids.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Done. Samples saved to {}", outcome.location);
    if report.has_failures() {
        println!(
            "The following tasks have failed, please rerun them manually: {}",
            report.failed_task_ids.join(",")
        );
    }
    Ok(())
}

fn parse_task_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
