//! Binary entry point for the covgen CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Generate scaffolds for every manifest entry
//! covgen generate --manifest coverage-zero.txt
//!
//! # Generate and check each scaffold with the test runner
//! covgen run --manifest coverage-zero.txt --limit 10
//!
//! # Repair failing or under-covered tests with the hosted model
//! covgen fix --manifest all-test-file.txt
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use covgen::batch::{run_fix_batch, run_generate_batch, BatchResult};
use covgen::config::{BatchOptions, ModelConfig, RunnerConfig};
use covgen::error::CovgenError;
use covgen::manifest::read_manifest;
use covgen::repair::HttpModelClient;
use covgen::report::{emit_report, BatchReport};

// ============================================================================
// CLI Structure
// ============================================================================

/// Coverage-driven unit test scaffolding.
#[derive(Parser, Debug)]
#[command(name = "covgen", version, about = "Coverage-driven unit test scaffolding")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Project root directory (default: current directory).
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Manifest file listing paths to process.
    #[arg(long, global = true, default_value = "coverage-zero.txt")]
    manifest: PathBuf,

    /// Process only the first N manifest entries.
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Emit the batch report as JSON instead of a text summary.
    #[arg(long, global = true)]
    json: bool,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate scaffold tests for manifest entries.
    Generate,
    /// Generate scaffolds and check each with the test runner.
    Run {
        /// Runner command as a JSON array; `{test}` and `{src}` expand per file.
        #[arg(long)]
        runner_command: Option<String>,

        /// Runner timeout in seconds.
        #[arg(long, default_value_t = 300)]
        timeout: u64,

        /// Coverage threshold (percent) for the pass predicate.
        #[arg(long, default_value_t = 90.0)]
        threshold: f64,
    },
    /// Repair failing or under-covered tests via the hosted model.
    Fix {
        /// Runner command as a JSON array; `{test}` and `{src}` expand per file.
        #[arg(long)]
        runner_command: Option<String>,

        /// Runner timeout in seconds.
        #[arg(long, default_value_t = 300)]
        timeout: u64,

        /// Coverage threshold (percent) for the pass predicate.
        #[arg(long, default_value_t = 90.0)]
        threshold: f64,

        /// Model endpoint base URL (OpenAI-compatible).
        #[arg(long)]
        base_url: Option<String>,

        /// Model name.
        #[arg(long)]
        model: Option<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(err.error_code().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), CovgenError> {
    let options = batch_options(&cli.global)?;
    let entries = read_manifest(&cli.global.manifest)?;

    let (mode, result) = match cli.command {
        Command::Generate => (
            "generate",
            run_generate_batch(&options, None, &entries),
        ),
        Command::Run {
            runner_command,
            timeout,
            threshold,
        } => {
            let mut options = options.with_runner();
            options.coverage_threshold = threshold;
            let runner = runner_config(&options, runner_command.as_deref(), timeout)?;
            ("run", run_generate_batch(&options, Some(&runner), &entries))
        }
        Command::Fix {
            runner_command,
            timeout,
            threshold,
            base_url,
            model,
        } => {
            let mut options = options;
            options.coverage_threshold = threshold;
            let runner = runner_config(&options, runner_command.as_deref(), timeout)?;
            let client = HttpModelClient::new(ModelConfig::from_env(base_url, model)?);
            ("fix", run_fix_batch(&options, &runner, &client, &entries))
        }
    };

    emit_result(mode, &result, cli.global.json)
}

/// Build batch options from global args.
fn batch_options(global: &GlobalArgs) -> Result<BatchOptions, CovgenError> {
    let project_root = match &global.project_root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    if !project_root.is_dir() {
        return Err(CovgenError::invalid_args(format!(
            "project root is not a directory: {}",
            project_root.display()
        )));
    }
    Ok(BatchOptions::for_project(project_root).with_limit(global.limit))
}

/// Build the runner config, parsing an optional JSON command override.
fn runner_config(
    options: &BatchOptions,
    command_json: Option<&str>,
    timeout_secs: u64,
) -> Result<RunnerConfig, CovgenError> {
    let mut config = RunnerConfig::for_project(&options.project_root)
        .with_timeout(Duration::from_secs(timeout_secs));

    if let Some(json) = command_json {
        let command: Vec<String> = serde_json::from_str(json).map_err(|e| {
            CovgenError::invalid_args(format!(
                "runner command must be a JSON array of strings: {}",
                e
            ))
        })?;
        if command.is_empty() {
            return Err(CovgenError::invalid_args("runner command cannot be empty"));
        }
        config = config.with_command(command);
    }

    Ok(config)
}

/// Print the batch report as JSON or a text summary.
fn emit_result(mode: &str, result: &BatchResult, json: bool) -> Result<(), CovgenError> {
    let report = BatchReport::from_result(mode, result);

    if json {
        emit_report(&report, &mut io::stdout())
            .map_err(|e| CovgenError::internal(e.to_string()))?;
    } else {
        print!("{}", report.text_summary());
    }
    let _ = io::stdout().flush();

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
