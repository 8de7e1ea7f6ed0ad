//! CLI command definitions for prompt-forge.
//!
//! `serve` runs the HTTP API; the other subcommands run a single operation
//! locally and print its result as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::api;
use crate::config::{LlmConfig, ServerConfig};
use crate::llm::TextGenerator;
use crate::metrics::init_metrics;
use crate::optimizer::{
    check_key, generate_examples, test_prompt, Example, OptimizationLoop,
    DEFAULT_MAX_ITERATIONS, DEFAULT_NUM_TO_GENERATE,
};

/// Iteratively optimize LLM prompts against input/output examples.
#[derive(Parser)]
#[command(name = "prompt-forge")]
#[command(about = "Iteratively optimize LLM prompts against input/output examples")]
#[command(version)]
#[command(
    long_about = "prompt-forge runs a prompt over a set of desired input/output examples, asks a critique model for a revised prompt and repeats until the prompt stops changing.\n\nExample usage:\n  prompt-forge optimize --prompt 'Translate to French: {{input}}' --examples examples.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Generation settings shared by every subcommand.
///
/// Unset flags fall back to the `OPENAI_*` environment variables.
#[derive(clap::Args, Debug, Default)]
pub struct LlmArgs {
    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Model used for generation and critique.
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,
}

impl LlmArgs {
    /// Resolve the generation config: flags first, then the environment.
    pub fn to_config(&self) -> anyhow::Result<LlmConfig> {
        let mut config = LlmConfig::from_env().context("Invalid LLM configuration")?;
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key(key.clone());
        }
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base.clone());
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        config.validate().context("Invalid LLM configuration")?;
        Ok(config)
    }
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// Optimize a prompt against a file of examples.
    #[command(alias = "opt")]
    Optimize(OptimizeArgs),

    /// Generate synthetic examples from a file of seed examples.
    #[command(name = "generate-examples", alias = "gen")]
    GenerateExamples(GenerateExamplesArgs),

    /// Run a prompt over a file of examples without optimizing it.
    #[command(name = "test-prompt")]
    TestPrompt(TestPromptArgs),

    /// Check that the configured API key works.
    #[command(name = "test-key")]
    TestKey,
}

/// Arguments for `prompt-forge serve`.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value = "5001")]
    pub port: u16,

    /// Disable permissive CORS headers.
    #[arg(long)]
    pub no_cors: bool,
}

impl ServeArgs {
    fn to_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            enable_cors: !self.no_cors,
        }
    }
}

/// Arguments for `prompt-forge optimize`.
#[derive(Parser, Debug)]
pub struct OptimizeArgs {
    /// Initial prompt; may contain the `{{input}}` placeholder.
    #[arg(long)]
    pub prompt: String,

    /// JSON file holding an array of `{"input", "output"}` objects.
    #[arg(short, long)]
    pub examples: PathBuf,

    /// Maximum number of optimization rounds.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,
}

/// Arguments for `prompt-forge generate-examples`.
#[derive(Parser, Debug)]
pub struct GenerateExamplesArgs {
    /// JSON file holding the seed examples.
    #[arg(short, long)]
    pub examples: PathBuf,

    /// Number of examples to request.
    #[arg(short = 'n', long, default_value_t = DEFAULT_NUM_TO_GENERATE)]
    pub count: usize,
}

/// Arguments for `prompt-forge test-prompt`.
#[derive(Parser, Debug)]
pub struct TestPromptArgs {
    /// Prompt to run; may contain the `{{input}}` placeholder.
    #[arg(long)]
    pub prompt: String,

    /// JSON file holding the examples.
    #[arg(short, long)]
    pub examples: PathBuf,
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
    let config = cli.llm.to_config()?;
    let generator = TextGenerator::from_config(&config)
        .context("Failed to initialize the OpenAI client")?;
    info!(model = %config.model, configured = generator.is_configured(), "Text generator ready");

    match cli.command {
        Commands::Serve(args) => run_serve_command(args, generator).await,
        Commands::Optimize(args) => run_optimize_command(args, &generator).await,
        Commands::GenerateExamples(args) => run_generate_examples_command(args, &generator).await,
        Commands::TestPrompt(args) => run_test_prompt_command(args, &generator).await,
        Commands::TestKey => run_test_key_command(&generator).await,
    }
}

async fn run_serve_command(args: ServeArgs, generator: TextGenerator) -> anyhow::Result<()> {
    init_metrics().context("Failed to initialize metrics")?;
    api::serve(&args.to_config(), generator).await
}

async fn run_optimize_command(args: OptimizeArgs, generator: &TextGenerator) -> anyhow::Result<()> {
    let examples = load_examples(&args.examples)?;
    let result = OptimizationLoop::new(generator)
        .run(&args.prompt, &examples, args.max_iterations)
        .await?;
    print_json(&result)
}

async fn run_generate_examples_command(
    args: GenerateExamplesArgs,
    generator: &TextGenerator,
) -> anyhow::Result<()> {
    let examples = load_examples(&args.examples)?;
    let generation = generate_examples(generator, &examples, args.count).await?;
    print_json(&generation)
}

async fn run_test_prompt_command(
    args: TestPromptArgs,
    generator: &TextGenerator,
) -> anyhow::Result<()> {
    let examples = load_examples(&args.examples)?;
    let results = test_prompt(generator, &args.prompt, &examples).await?;
    print_json(&results)
}

async fn run_test_key_command(generator: &TextGenerator) -> anyhow::Result<()> {
    let check = check_key(generator).await;
    print_json(&check)?;
    if check.success {
        Ok(())
    } else {
        anyhow::bail!("API key check failed: {}", check.message)
    }
}

/// Load an array of examples from a JSON file.
fn load_examples(path: &Path) -> anyhow::Result<Vec<Example>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read examples from {}", path.display()))?;
    parse_examples(&raw).with_context(|| format!("Invalid examples file {}", path.display()))
}

fn parse_examples(raw: &str) -> anyhow::Result<Vec<Example>> {
    Ok(serde_json::from_str(raw)?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
