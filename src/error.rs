//! Error types and exit-code constants for covgen.
//!
//! This module provides a unified error type (`CovgenError`) that bridges
//! subsystem errors (resolver, runner, repair) into a common format suitable
//! for JSON output and stable process exit codes.
//!
//! ## Exit Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (source file or manifest not found)
//! - `4`: Generation errors (failed to write a test file)
//! - `5`: Runner failed (nonzero exit, timeout, or coverage shortfall)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (source file, manifest, or directory not found).
    ResolutionError = 3,
    /// Generation errors (failed to write a test file).
    GenerationError = 4,
    /// Runner failed (nonzero exit, timeout, coverage shortfall).
    RunnerFailed = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// All subsystem errors are converted to this type before being rendered as a
/// diagnostic or JSON error response.
#[derive(Debug, Error)]
pub enum CovgenError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Manifest file missing or unreadable.
    #[error("manifest not readable: {path}: {message}")]
    ManifestError { path: PathBuf, message: String },

    /// Source file not found under the project root.
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Failed to write a generated test file.
    #[error("failed to write test file {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// Test runner failed (nonzero exit, timeout, or coverage shortfall).
    #[error("runner failed: {message}")]
    RunnerFailed { message: String },

    /// Model endpoint invocation failed.
    #[error("model invocation failed: {message}")]
    ModelError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl CovgenError {
    /// Create an InvalidArguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CovgenError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an InternalError.
    pub fn internal(message: impl Into<String>) -> Self {
        CovgenError::InternalError {
            message: message.into(),
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&CovgenError> for OutputErrorCode {
    fn from(err: &CovgenError) -> Self {
        match err {
            CovgenError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            CovgenError::ManifestError { .. } => OutputErrorCode::ResolutionError,
            CovgenError::SourceNotFound { .. } => OutputErrorCode::ResolutionError,
            CovgenError::WriteFailed { .. } => OutputErrorCode::GenerationError,
            CovgenError::RunnerFailed { .. } => OutputErrorCode::RunnerFailed,
            CovgenError::ModelError { .. } => OutputErrorCode::RunnerFailed,
            CovgenError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<CovgenError> for OutputErrorCode {
    fn from(err: CovgenError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<std::io::Error> for CovgenError {
    fn from(err: std::io::Error) -> Self {
        CovgenError::InternalError {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_tests {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_2() {
            let err = CovgenError::invalid_args("bad flag");
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn source_not_found_maps_to_3() {
            let err = CovgenError::SourceNotFound {
                path: PathBuf::from("components/Foo.vue"),
            };
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }

        #[test]
        fn write_failed_maps_to_4() {
            let err = CovgenError::WriteFailed {
                path: PathBuf::from("test/Foo.vue.test.ts"),
                message: "permission denied".to_string(),
            };
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn runner_failed_maps_to_5() {
            let err = CovgenError::RunnerFailed {
                message: "exit code 1".to_string(),
            };
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn internal_maps_to_10() {
            let err = CovgenError::internal("oops");
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod display_tests {
        use super::*;

        #[test]
        fn source_not_found_names_the_path() {
            let err = CovgenError::SourceNotFound {
                path: PathBuf::from("components/Foo.vue"),
            };
            assert!(err.to_string().contains("components/Foo.vue"));
        }

        #[test]
        fn io_error_bridges_to_internal() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
            let err = CovgenError::from(io);
            assert!(matches!(err, CovgenError::InternalError { .. }));
        }
    }
}
