//! Configuration for the batch driver, test runner, and model endpoint.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::CovgenError;

/// Default coverage threshold (percent) below which a test needs repair.
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 90.0;

/// Default wall-clock limit for a single runner invocation.
pub const DEFAULT_RUNNER_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable carrying the model API credential.
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Default OpenAI-compatible endpoint for the hosted model.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "qwen3-coder-plus";

/// Configuration for invoking the external test runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Command template (first element is the program). `{test}` and `{src}`
    /// expand to the test file path and the coverage include filter.
    pub command: Vec<String>,
    /// Working directory for the runner (the project root).
    pub project_root: PathBuf,
    /// Wall-clock limit; past it the child is killed and the run fails.
    pub timeout: Duration,
}

impl RunnerConfig {
    /// Default vitest invocation for a project root.
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        RunnerConfig {
            command: default_runner_command(),
            project_root: project_root.into(),
            timeout: DEFAULT_RUNNER_TIMEOUT,
        }
    }

    /// Set the runner timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the command template.
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    /// Expand the command template for a concrete (test, source) pair.
    pub fn command_for(&self, test_path: &str, src_path: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| arg.replace("{test}", test_path).replace("{src}", src_path))
            .collect()
    }
}

/// Default vitest command with per-file coverage scoping.
pub fn default_runner_command() -> Vec<String> {
    vec![
        "npx".to_string(),
        "vitest".to_string(),
        "run".to_string(),
        "{test}".to_string(),
        "--coverage".to_string(),
        "--run".to_string(),
        "--coverage.include={src}".to_string(),
    ]
}

/// Configuration for the hosted model endpoint.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// OpenAI-compatible base URL (chat completions).
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// API credential.
    pub api_key: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl ModelConfig {
    /// Build a config from the environment, reading the credential from
    /// `DASHSCOPE_API_KEY`.
    pub fn from_env(base_url: Option<String>, model: Option<String>) -> Result<Self, CovgenError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| CovgenError::ModelError {
            message: format!("{} not set", API_KEY_ENV),
        })?;

        Ok(ModelConfig {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            temperature: 0.2,
        })
    }
}

/// Options for a batch run over a manifest.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Project root containing the source and test roots.
    pub project_root: PathBuf,
    /// Source root, relative to the project root.
    pub source_root: String,
    /// Test root, relative to the project root.
    pub test_root: String,
    /// Process only the first N manifest entries.
    pub limit: Option<usize>,
    /// Run the test runner after generating each scaffold.
    pub run_tests: bool,
    /// Coverage threshold for the pass predicate.
    pub coverage_threshold: f64,
}

impl BatchOptions {
    /// Generate-only options for a project root.
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        BatchOptions {
            project_root: project_root.into(),
            source_root: "src".to_string(),
            test_root: "test".to_string(),
            limit: None,
            run_tests: false,
            coverage_threshold: DEFAULT_COVERAGE_THRESHOLD,
        }
    }

    /// Limit processing to a manifest prefix.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Enable the runner after generation.
    pub fn with_runner(mut self) -> Self {
        self.run_tests = true;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
