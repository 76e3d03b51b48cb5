//! Coverage-driven test repair via a hosted language model.
//!
//! When a scaffold fails or covers less than the threshold, up to three
//! successive prompts are sent to an OpenAI-compatible chat endpoint: a
//! failure analysis (only when tests failed), a coverage-gap analysis (only
//! when under threshold), and a regeneration request whose response replaces
//! the test file wholesale. The batch then re-runs the test once. No rollback
//! and no second attempt.
//!
//! Per-entry state machine:
//! `pending -> generated -> {runner-pass, runner-fail} -> (fail only) ->
//! model-rewritten -> re-run -> {pass, fail-final}`.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{ModelConfig, RunnerConfig};
use crate::error::CovgenError;
use crate::runner::{run_test, RunResult};

/// A synchronous chat-completion client. The seam exists so the repair flow
/// is testable without a network.
pub trait ModelClient {
    /// Send one prompt and return the model's text response.
    fn complete(&self, prompt: &str) -> Result<String, CovgenError>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// Blocking client for an OpenAI-compatible chat completions endpoint.
pub struct HttpModelClient {
    config: ModelConfig,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl HttpModelClient {
    /// Create a client from a model config.
    pub fn new(config: ModelConfig) -> Self {
        HttpModelClient {
            config,
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl ModelClient for HttpModelClient {
    fn complete(&self, prompt: &str) -> Result<String, CovgenError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| CovgenError::ModelError {
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(CovgenError::ModelError {
                message: format!("endpoint returned {}", response.status()),
            });
        }

        let parsed: ChatResponse = response.json().map_err(|e| CovgenError::ModelError {
            message: format!("malformed response: {}", e),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CovgenError::ModelError {
                message: "response contained no choices".to_string(),
            })
    }
}

// ============================================================================
// Prompts
// ============================================================================

fn failure_analysis_prompt(test_content: &str, result: &RunResult) -> String {
    format!(
        "Analyze the following test file and test output and identify why the tests fail.\n\n\
         Test file:\n{}\n\n\
         Test stdout:\n{}\n\n\
         Test stderr:\n{}\n\n\
         Answer:\n\
         1. Which test cases failed?\n\
         2. Why did they fail?\n\
         3. How should the failing test cases be fixed?\n",
        test_content, result.stdout, result.stderr
    )
}

fn coverage_analysis_prompt(src_content: &str, test_content: &str, coverage: f64) -> String {
    format!(
        "Analyze the following source and test code and identify the parts the tests do not cover.\n\n\
         Source code:\n{}\n\n\
         Test code:\n{}\n\n\
         Current coverage: {}%\n\n\
         Answer:\n\
         1. Which branches or functions are uncovered?\n\
         2. Why are they uncovered?\n\
         3. Which test cases would raise coverage?\n",
        src_content, test_content, coverage
    )
}

fn regeneration_prompt(
    src_content: &str,
    test_content: &str,
    coverage_analysis: &str,
    failure_analysis: &str,
) -> String {
    format!(
        "Based on the following, generate or modify test cases to raise coverage and fix failures.\n\n\
         Source code:\n{}\n\n\
         Current test code:\n{}\n\n\
         Coverage analysis:\n{}\n\n\
         Failure analysis:\n{}\n\n\
         Requirements:\n\
         1. Fix every failing test case.\n\
         2. Add test cases to raise coverage above 90%.\n\
         3. Keep existing passing test cases unchanged.\n\
         4. Return only the complete, updated test file content with no commentary.\n",
        src_content, test_content, coverage_analysis, failure_analysis
    )
}

/// Strip a surrounding Markdown code fence, if present. Models regularly wrap
/// file content in ```...``` despite being asked not to.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    match body.find('\n') {
        Some(idx) => &body[idx + 1..],
        None => body,
    }
}

// ============================================================================
// Repair Flow
// ============================================================================

/// Outcome of one repair attempt.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Result of the re-run after the rewrite.
    pub rerun: RunResult,
}

/// Attempt to repair a failing or under-covered test.
///
/// `test_rel` and `src_rel` are relative to the runner's project root. Reads
/// both files, runs the analysis prompts the result calls for, rewrites the
/// test file with the regeneration response verbatim, and re-runs once.
pub fn repair_test(
    client: &dyn ModelClient,
    runner: &RunnerConfig,
    test_rel: &str,
    src_rel: &str,
    result: &RunResult,
    threshold: f64,
) -> Result<RepairOutcome, CovgenError> {
    let test_path: PathBuf = runner.project_root.join(test_rel);
    let src_path: PathBuf = runner.project_root.join(src_rel);
    info!(test = %test_path.display(), "repairing test file");

    let test_content = fs::read_to_string(&test_path)?;
    let src_content = fs::read_to_string(&src_path)?;

    let failure_analysis = if !result.passed {
        debug!("analyzing failing test cases");
        client.complete(&failure_analysis_prompt(&test_content, result))?
    } else {
        String::new()
    };

    let coverage_analysis = if result.coverage < threshold {
        debug!(coverage = result.coverage, "analyzing coverage gaps");
        client.complete(&coverage_analysis_prompt(
            &src_content,
            &test_content,
            result.coverage,
        ))?
    } else {
        String::new()
    };

    let regenerated = client.complete(&regeneration_prompt(
        &src_content,
        &test_content,
        &coverage_analysis,
        &failure_analysis,
    ))?;

    fs::write(&test_path, strip_code_fence(&regenerated)).map_err(|e| {
        CovgenError::WriteFailed {
            path: test_path.clone(),
            message: e.to_string(),
        }
    })?;

    let rerun = run_test(runner, test_rel, src_rel)?;
    info!(
        passed = rerun.passed,
        coverage = rerun.coverage,
        "re-run after rewrite"
    );

    Ok(RepairOutcome { rerun })
}

// ============================================================================
// Tests
// ============================================================================
