//! Structured error handling and exit codes.

use serde::Serialize;

use crate::cache::CacheError;

/// Exit codes for the RustGallery application.
///
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments, reported by clap)
/// - 3: The cache file belongs to a different root
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the gallery page was produced.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Usage error: invalid command-line arguments.
    Usage = 2,
    /// Cache root mismatch: the stored cache is stale or corrupted.
    RootMismatch = 3,
    /// Interrupted: the run was stopped by Ctrl+C.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RG000",
            Self::GeneralError => "RG001",
            Self::Usage => "RG002",
            Self::RootMismatch => "RG003",
            Self::Interrupted => "RG130",
        }
    }

    /// Pick the exit code for an application error by inspecting its chain.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(AppError::Interrupted { .. }) = cause.downcast_ref::<AppError>() {
                return Self::Interrupted;
            }
            if let Some(CacheError::RootMismatch { .. }) = cause.downcast_ref::<CacheError>() {
                return Self::RootMismatch;
            }
        }
        Self::GeneralError
    }
}

/// Application-level failures that are not owned by a library module.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Ctrl+C was pressed before all images were processed.
    #[error("Interrupted after {processed} of {total} images")]
    Interrupted {
        /// Images added to the cache before stopping
        processed: usize,
        /// Images found by the scan
        total: usize,
    },
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RG001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
