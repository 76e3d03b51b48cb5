//! External test runner invocation and coverage scraping.
//!
//! The runner is a subprocess bounded by a wall-clock timeout. Its combined
//! stdout/stderr is captured and scraped for a coverage percentage from the
//! text report's `All files | <total> | <coverage>` line. A run that prints no
//! such line reads as `0.0`; that is indistinguishable from genuine zero
//! coverage, so the absence is logged at warn level.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::config::RunnerConfig;
use crate::error::CovgenError;

/// Result of one runner invocation. Ephemeral; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether every test passed.
    pub passed: bool,
    /// Coverage percentage scraped from the report, 0.0 when absent.
    pub coverage: f64,
    /// Failure notes (timeout, spawn errors, nonzero exit).
    pub failures: Vec<String>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// Wall-clock duration of the invocation.
    pub duration_secs: f64,
}

impl RunResult {
    /// A failed result with a single note and no output.
    fn failed(note: impl Into<String>, duration: Duration) -> Self {
        RunResult {
            passed: false,
            coverage: 0.0,
            failures: vec![note.into()],
            stdout: String::new(),
            stderr: String::new(),
            duration_secs: duration.as_secs_f64(),
        }
    }

    /// Pass predicate against a coverage threshold.
    pub fn meets(&self, threshold: f64) -> bool {
        self.passed && self.coverage >= threshold
    }
}

fn coverage_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"All files\s+\|\s+\d+\.\d+\s+\|\s+(\d+\.\d+)")
            .unwrap_or_else(|e| panic!("coverage regex: {}", e))
    })
}

/// Scrape the coverage percentage from runner output.
///
/// Returns `0.0` when the report line is absent or the capture does not parse.
pub fn parse_coverage(stdout: &str) -> f64 {
    match coverage_regex().captures(stdout) {
        Some(caps) => caps
            .get(1)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0),
        None => {
            warn!("no coverage table in runner output; reading as 0.0");
            0.0
        }
    }
}

/// Decide pass/fail from runner output and exit status.
///
/// The runner's summary wording decides when output is present: `passed`
/// without `failed` means green. Empty output falls back to the exit status.
pub fn parse_run(stdout: &str, stderr: &str, exit_ok: bool, duration: Duration) -> RunResult {
    let passed = if stdout.is_empty() {
        exit_ok
    } else {
        stdout.contains("passed") && !stdout.contains("failed")
    };

    let mut failures = Vec::new();
    if !passed && !exit_ok {
        failures.push("runner exited with nonzero status".to_string());
    }

    RunResult {
        passed,
        coverage: parse_coverage(stdout),
        failures,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        duration_secs: duration.as_secs_f64(),
    }
}

/// Run the test command for a (test, source) pair.
///
/// The command template expands `{test}` and `{src}`, runs with the project
/// root as cwd, and is killed past the configured timeout. Spawn failures and
/// timeouts are reported as failed results, not errors; the batch driver
/// decides what to do with them.
pub fn run_test(
    config: &RunnerConfig,
    test_path: &str,
    src_path: &str,
) -> Result<RunResult, CovgenError> {
    let command = config.command_for(test_path, src_path);
    if command.is_empty() {
        return Err(CovgenError::invalid_args("empty runner command"));
    }

    debug!(command = ?command, "invoking test runner");
    let start = Instant::now();

    let mut cmd = Command::new(&command[0]);
    cmd.args(&command[1..])
        .current_dir(&config.project_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return Ok(RunResult::failed(
                format!("failed to spawn runner: {}", e),
                start.elapsed(),
            ));
        }
    };

    match child.wait_timeout(config.timeout)? {
        Some(status) => {
            let stdout = child
                .stdout
                .take()
                .map(|mut s| {
                    let mut buf = Vec::new();
                    s.read_to_end(&mut buf).ok();
                    buf
                })
                .unwrap_or_default();
            let stderr = child
                .stderr
                .take()
                .map(|mut s| {
                    let mut buf = Vec::new();
                    s.read_to_end(&mut buf).ok();
                    buf
                })
                .unwrap_or_default();

            Ok(parse_run(
                &String::from_utf8_lossy(&stdout),
                &String::from_utf8_lossy(&stderr),
                status.success(),
                start.elapsed(),
            ))
        }
        None => {
            // Timeout: kill and reap.
            let _ = child.kill();
            let _ = child.wait();
            warn!(?command, timeout = ?config.timeout, "test runner timed out");
            Ok(RunResult::failed(
                format!("runner timed out after {:?}", config.timeout),
                start.elapsed(),
            ))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_coverage_tests {
        use super::*;

        #[test]
        fn extracts_second_column_from_report_line() {
            let coverage = parse_coverage("All files | 85.10 | 92.34");
            assert!((coverage - 92.34).abs() < f64::EPSILON);
        }

        #[test]
        fn extracts_from_surrounding_output() {
            let stdout = "Test Files  3 passed (3)\n\
                          ----------|---------|---------\n\
                          All files |   85.10 |   92.34 |\n\
                          ----------|---------|---------\n";
            let coverage = parse_coverage(stdout);
            assert!((coverage - 92.34).abs() < f64::EPSILON);
        }

        #[test]
        fn absent_report_line_reads_zero() {
            assert_eq!(parse_coverage("no coverage table here"), 0.0);
            assert_eq!(parse_coverage(""), 0.0);
        }

        #[test]
        fn integer_columns_do_not_match() {
            // The report always prints decimals; plain integers are not a table.
            assert_eq!(parse_coverage("All files | 85 | 92"), 0.0);
        }
    }

    mod parse_run_tests {
        use super::*;

        #[test]
        fn passed_without_failed_is_green() {
            let result = parse_run(
                "Test Files  2 passed (2)",
                "",
                true,
                Duration::from_millis(10),
            );
            assert!(result.passed);
        }

        #[test]
        fn failed_in_output_is_red_even_on_zero_exit() {
            let result = parse_run(
                "Test Files  1 failed | 1 passed (2)",
                "",
                true,
                Duration::from_millis(10),
            );
            assert!(!result.passed);
        }

        #[test]
        fn empty_output_falls_back_to_exit_status() {
            assert!(parse_run("", "", true, Duration::ZERO).passed);
            assert!(!parse_run("", "", false, Duration::ZERO).passed);
        }

        #[test]
        fn meets_requires_both_pass_and_coverage() {
            let result = parse_run(
                "1 passed\nAll files | 85.10 | 92.34 |",
                "",
                true,
                Duration::ZERO,
            );
            assert!(result.meets(90.0));
            assert!(!result.meets(95.0));
        }
    }

    #[cfg(unix)]
    mod subprocess_tests {
        use super::*;
        use crate::config::RunnerConfig;
        use tempfile::TempDir;

        #[test]
        fn runs_command_in_project_root() {
            let dir = TempDir::new().unwrap();
            let config = RunnerConfig::for_project(dir.path())
                .with_command(vec!["pwd".to_string()]);

            let result = run_test(&config, "unused", "unused").unwrap();
            let reported = std::path::PathBuf::from(result.stdout.trim());
            assert_eq!(reported, dir.path().canonicalize().unwrap());
        }

        #[test]
        fn template_variables_reach_the_command() {
            let dir = TempDir::new().unwrap();
            let config = RunnerConfig::for_project(dir.path()).with_command(vec![
                "echo".to_string(),
                "{test}".to_string(),
                "{src}".to_string(),
            ]);

            let result = run_test(&config, "test/a.test.ts", "src/a.ts").unwrap();
            assert!(result.stdout.contains("test/a.test.ts"));
            assert!(result.stdout.contains("src/a.ts"));
        }

        #[test]
        fn timeout_kills_long_running_command() {
            let dir = TempDir::new().unwrap();
            let config = RunnerConfig::for_project(dir.path())
                .with_command(vec!["sleep".to_string(), "10".to_string()])
                .with_timeout(Duration::from_millis(200));

            let result = run_test(&config, "t", "s").unwrap();
            assert!(!result.passed);
            assert!(result.failures[0].contains("timed out"));
            assert!(result.duration_secs < 5.0);
        }

        #[test]
        fn missing_program_is_a_failed_result_not_an_error() {
            let dir = TempDir::new().unwrap();
            let config = RunnerConfig::for_project(dir.path())
                .with_command(vec!["covgen-no-such-program".to_string()]);

            let result = run_test(&config, "t", "s").unwrap();
            assert!(!result.passed);
            assert!(result.failures[0].contains("spawn"));
        }

        #[test]
        fn nonzero_exit_records_a_failure_note() {
            let dir = TempDir::new().unwrap();
            let config = RunnerConfig::for_project(dir.path())
                .with_command(vec!["false".to_string()]);

            let result = run_test(&config, "t", "s").unwrap();
            assert!(!result.passed);
            assert!(result.failures[0].contains("nonzero"));
        }
    }
}
