//! Batch driver: walks manifest entries, generates scaffolds, and partitions
//! entries into completed and remaining.
//!
//! Entries are processed strictly in manifest order, each to completion
//! (including any blocking runner invocation) before the next begins. A
//! failed entry is recorded as remaining and never retried within the run;
//! the manifest itself is never written back.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{BatchOptions, RunnerConfig};
use crate::error::CovgenError;
use crate::repair::{repair_test, ModelClient};
use crate::resolve::{is_source_file, resolve, source_for_test, ResolvedSource};
use crate::runner::run_test;
use crate::template::render;

/// Outcome of one manifest entry.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    /// The manifest line.
    pub entry: String,
    /// Whether the entry completed (all generate/run steps succeeded).
    pub completed: bool,
    /// Test files generated or rewritten for this entry, project-relative.
    pub generated: Vec<String>,
    /// Diagnostics accumulated while processing.
    pub notes: Vec<String>,
}

impl EntryOutcome {
    fn new(entry: &str) -> Self {
        EntryOutcome {
            entry: entry.to_string(),
            completed: false,
            generated: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Partitioned result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Per-entry outcomes in manifest order.
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchResult {
    /// Entries that completed, in manifest order.
    pub fn completed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.completed)
            .map(|o| o.entry.as_str())
            .collect()
    }

    /// Entries left for another run, in manifest order.
    pub fn remaining(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.completed)
            .map(|o| o.entry.as_str())
            .collect()
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generate the scaffold test for one relative source path.
///
/// Verifies that the source exists under the project's source root, renders
/// the template for its kind, and writes the test file (directories created
/// as needed, prior content overwritten wholesale).
pub fn generate_test(
    options: &BatchOptions,
    source_rel: &str,
) -> Result<ResolvedSource, CovgenError> {
    let resolved = resolve(source_rel, &options.test_root).ok_or_else(|| {
        CovgenError::invalid_args(format!("not a source file: {}", source_rel))
    })?;

    let source_abs = options
        .project_root
        .join(&options.source_root)
        .join(source_rel);
    if !source_abs.is_file() {
        return Err(CovgenError::SourceNotFound { path: source_abs });
    }

    let test_abs = options.project_root.join(&resolved.test_path);
    if let Some(parent) = test_abs.parent() {
        fs::create_dir_all(parent).map_err(|e| CovgenError::WriteFailed {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    fs::write(&test_abs, render(&resolved)).map_err(|e| CovgenError::WriteFailed {
        path: test_abs.clone(),
        message: e.to_string(),
    })?;

    info!(test = %resolved.test_path.display(), "generated scaffold");
    Ok(resolved)
}

/// Enumerate recognized source files under a directory, relative to the
/// source root. Recurses fully; results are sorted for deterministic order.
pub fn collect_source_files(source_root_abs: &Path, dir_rel: &str) -> Vec<String> {
    let dir_abs = source_root_abs.join(dir_rel);
    let mut files = Vec::new();

    for entry in WalkDir::new(&dir_abs).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(source_root_abs) else {
            continue;
        };
        let rel = rel.to_string_lossy().to_string();
        if is_source_file(&rel) {
            files.push(rel);
        }
    }

    files.sort();
    files
}

// ============================================================================
// Generate Batch
// ============================================================================

/// Process manifest entries: generate scaffolds and optionally run each test.
///
/// Per entry: a directory is recursed and every contained source file
/// processed; a recognized source file is processed directly; anything else
/// is skipped with a diagnostic and left in the remaining list.
pub fn run_generate_batch(
    options: &BatchOptions,
    runner: Option<&RunnerConfig>,
    entries: &[String],
) -> BatchResult {
    let take = options.limit.unwrap_or(entries.len());
    let selected = &entries[..take.min(entries.len())];
    let mut result = BatchResult::default();

    for (i, entry) in selected.iter().enumerate() {
        info!("[{}/{}] processing {}", i + 1, selected.len(), entry);
        result
            .outcomes
            .push(process_generate_entry(options, runner, entry));
    }

    result
}

fn process_generate_entry(
    options: &BatchOptions,
    runner: Option<&RunnerConfig>,
    entry: &str,
) -> EntryOutcome {
    let mut outcome = EntryOutcome::new(entry);
    let source_root_abs = options.project_root.join(&options.source_root);

    if source_root_abs.join(entry).is_dir() {
        let sources = collect_source_files(&source_root_abs, entry);
        info!("directory {} contains {} source files", entry, sources.len());

        let mut all_ok = !sources.is_empty();
        for source in &sources {
            if !process_single_source(options, runner, source, &mut outcome) {
                all_ok = false;
            }
        }
        if sources.is_empty() {
            outcome.notes.push("directory contains no source files".to_string());
        }
        outcome.completed = all_ok;
    } else if is_source_file(entry) {
        outcome.completed = process_single_source(options, runner, entry, &mut outcome);
    } else {
        warn!("skipping non-source entry: {}", entry);
        outcome.notes.push("skipped: not a source file".to_string());
    }

    outcome
}

/// Generate (and optionally run) one source file; true on success.
fn process_single_source(
    options: &BatchOptions,
    runner: Option<&RunnerConfig>,
    source_rel: &str,
    outcome: &mut EntryOutcome,
) -> bool {
    let resolved = match generate_test(options, source_rel) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("{}", e);
            outcome.notes.push(e.to_string());
            return false;
        }
    };

    let test_rel = resolved.test_path.to_string_lossy().to_string();
    outcome.generated.push(test_rel.clone());

    let Some(runner) = runner else {
        return true;
    };

    let src_rel = format!("{}/{}", options.source_root, source_rel);
    match run_test(runner, &test_rel, &src_rel) {
        Ok(run) if run.meets(options.coverage_threshold) => true,
        Ok(run) => {
            outcome.notes.push(format!(
                "{}: passed={} coverage={:.2}%",
                source_rel, run.passed, run.coverage
            ));
            false
        }
        Err(e) => {
            outcome.notes.push(e.to_string());
            false
        }
    }
}

// ============================================================================
// Fix Batch
// ============================================================================

/// Process a manifest of test-file paths: run each against its subject
/// source, and hand failing or under-covered pairs to the repair loop.
///
/// A model invocation failure is logged and counted against the entry; the
/// batch continues with the next entry.
pub fn run_fix_batch(
    options: &BatchOptions,
    runner: &RunnerConfig,
    client: &dyn ModelClient,
    entries: &[String],
) -> BatchResult {
    let take = options.limit.unwrap_or(entries.len());
    let selected = &entries[..take.min(entries.len())];
    let mut result = BatchResult::default();

    for (i, entry) in selected.iter().enumerate() {
        info!("[{}/{}] processing {}", i + 1, selected.len(), entry);
        result
            .outcomes
            .push(process_fix_entry(options, runner, client, entry));
    }

    result
}

fn process_fix_entry(
    options: &BatchOptions,
    runner: &RunnerConfig,
    client: &dyn ModelClient,
    entry: &str,
) -> EntryOutcome {
    let mut outcome = EntryOutcome::new(entry);

    let Some(source_rel) = source_for_test(entry, &options.test_root) else {
        warn!("skipping entry without a subject source: {}", entry);
        outcome
            .notes
            .push("skipped: not a generated test path".to_string());
        return outcome;
    };

    let src_rel = format!("{}/{}", options.source_root, source_rel);
    let src_abs: PathBuf = options.project_root.join(&src_rel);
    if !src_abs.is_file() {
        let e = CovgenError::SourceNotFound { path: src_abs };
        warn!("{}", e);
        outcome.notes.push(e.to_string());
        return outcome;
    }

    let run = match run_test(runner, entry, &src_rel) {
        Ok(run) => run,
        Err(e) => {
            outcome.notes.push(e.to_string());
            return outcome;
        }
    };

    if run.meets(options.coverage_threshold) {
        info!("{}: passed with {:.2}% coverage", entry, run.coverage);
        outcome.completed = true;
        return outcome;
    }

    info!(
        "{}: passed={} coverage={:.2}%, attempting repair",
        entry, run.passed, run.coverage
    );
    match repair_test(
        client,
        runner,
        entry,
        &src_rel,
        &run,
        options.coverage_threshold,
    ) {
        Ok(repaired) => {
            outcome.generated.push(entry.to_string());
            if repaired.rerun.meets(options.coverage_threshold) {
                outcome.completed = true;
            } else {
                outcome.notes.push(format!(
                    "after rewrite: passed={} coverage={:.2}%",
                    repaired.rerun.passed, repaired.rerun.coverage
                ));
            }
        }
        Err(e) => {
            warn!("repair failed for {}: {}", entry, e);
            outcome.notes.push(e.to_string());
        }
    }

    outcome
}

// ============================================================================
// Tests
// ============================================================================
