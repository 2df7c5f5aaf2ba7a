//! Exit codes and structured error output.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: completed; every file was processed
/// - 1: fatal error before or during setup (bad flags, bad config, no folder)
/// - 3: completed, but some files were skipped after read, stat or delete errors
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed without per-file errors.
    Success = 0,
    /// Fatal error.
    GeneralError = 1,
    /// Completed with skipped files.
    PartialSuccess = 3,
    /// Interrupted by the user.
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
            Self::Success => "RF000",
            Self::GeneralError => "RF001",
            Self::PartialSuccess => "RF003",
            Self::Interrupted => "RF130",
        }
    }
}

/// Fatal error as printed by `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
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
