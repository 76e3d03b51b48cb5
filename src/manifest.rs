//! Manifest reading.
//!
//! A manifest is a flat text file naming one relative source path or directory
//! per line. It is read once, consumed in file order, and never written back;
//! the batch driver derives completed/remaining lists from it per run.

use std::fs;
use std::path::Path;

use crate::error::CovgenError;

/// Read manifest entries, skipping blank lines and preserving file order.
pub fn read_manifest(path: &Path) -> Result<Vec<String>, CovgenError> {
    let content = fs::read_to_string(path).map_err(|e| CovgenError::ManifestError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
