//! JSON batch report and serialization.
//!
//! Every batch run emits one report to stdout. `status` is the first field,
//! the schema is versioned, and field order is deterministic, so the output
//! is stable for scripting. Completed and remaining lists are derived per
//! run and never written back to the manifest.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::batch::BatchResult;

/// Current schema version for the batch report.
pub const SCHEMA_VERSION: &str = "1";

/// Per-entry record in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryReport {
    /// The manifest line.
    pub entry: String,
    /// Whether the entry completed.
    pub completed: bool,
    /// Test files generated or rewritten, project-relative.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub generated: Vec<String>,
    /// Diagnostics accumulated while processing.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// "ok" when every processed entry completed, "partial" otherwise.
    pub status: String,
    /// Report schema version.
    pub schema_version: String,
    /// Subcommand that produced the report.
    pub mode: String,
    /// ISO 8601 timestamp of report creation.
    pub timestamp: String,
    /// Entries that completed, in manifest order.
    pub completed: Vec<String>,
    /// Entries left for another run, in manifest order.
    pub remaining: Vec<String>,
    /// Per-entry detail.
    pub entries: Vec<EntryReport>,
}

impl BatchReport {
    /// Build a report from a batch result.
    pub fn from_result(mode: &str, result: &BatchResult) -> Self {
        let completed: Vec<String> =
            result.completed().iter().map(|s| s.to_string()).collect();
        let remaining: Vec<String> =
            result.remaining().iter().map(|s| s.to_string()).collect();

        let status = if remaining.is_empty() { "ok" } else { "partial" };

        BatchReport {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            mode: mode.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            completed,
            remaining,
            entries: result
                .outcomes
                .iter()
                .map(|o| EntryReport {
                    entry: o.entry.clone(),
                    completed: o.completed,
                    generated: o.generated.clone(),
                    notes: o.notes.clone(),
                })
                .collect(),
        }
    }

    /// Human-readable summary for the terminal.
    pub fn text_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "completed: {} entries\nremaining: {} entries\n",
            self.completed.len(),
            self.remaining.len()
        ));
        for entry in &self.completed {
            out.push_str(&format!("  done  {}\n", entry));
        }
        for entry in &self.remaining {
            out.push_str(&format!("  todo  {}\n", entry));
        }
        out
    }
}

/// Serialize a report as pretty JSON followed by a newline.
pub fn emit_report<W: Write>(report: &BatchReport, writer: &mut W) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::EntryOutcome;

    fn sample_result() -> BatchResult {
        BatchResult {
            outcomes: vec![
                EntryOutcome {
                    entry: "components/Foo.vue".to_string(),
                    completed: true,
                    generated: vec!["test/components/Foo.vue.test.ts".to_string()],
                    notes: vec![],
                },
                EntryOutcome {
                    entry: "hooks/useBar.ts".to_string(),
                    completed: false,
                    generated: vec![],
                    notes: vec!["source file not found".to_string()],
                },
            ],
        }
    }

    #[test]
    fn partial_status_when_entries_remain() {
        let report = BatchReport::from_result("generate", &sample_result());
        assert_eq!(report.status, "partial");
        assert_eq!(report.completed, vec!["components/Foo.vue"]);
        assert_eq!(report.remaining, vec!["hooks/useBar.ts"]);
    }

    #[test]
    fn ok_status_when_everything_completed() {
        let mut result = sample_result();
        result.outcomes[1].completed = true;
        let report = BatchReport::from_result("generate", &result);
        assert_eq!(report.status, "ok");
    }

    #[test]
    fn status_is_the_first_json_field() {
        let report = BatchReport::from_result("fix", &sample_result());
        let mut buf = Vec::new();
        emit_report(&report, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let first_field = text.lines().nth(1).unwrap();
        assert!(first_field.trim_start().starts_with("\"status\""));
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = BatchReport::from_result("generate", &sample_result());
        let json = serde_json::to_string(&report).unwrap();
        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn text_summary_counts_both_lists() {
        let report = BatchReport::from_result("generate", &sample_result());
        let summary = report.text_summary();
        assert!(summary.contains("completed: 1 entries"));
        assert!(summary.contains("remaining: 1 entries"));
        assert!(summary.contains("todo  hooks/useBar.ts"));
    }
}
