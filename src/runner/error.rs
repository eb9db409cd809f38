//! Command-execution error types
//!
//! Backend failures (the tool ran but reported no result) and spawn
//! failures (the process could not start) are both recovered locally into
//! user-visible messages; neither is retried automatically.

use thiserror::Error;

/// A backend process ran but its result counts as a failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFailure {
    /// Non-zero exit from an adapter with `exit_code_error`
    #[error("exit code {exit_code} from `{command}`")]
    ExitCode { exit_code: i32, command: String },

    /// Output matched one of the adapter's error patterns
    #[error("output matched '{pattern}' from `{command}`")]
    Pattern { pattern: String, command: String },
}

/// Errors from running a backend command
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    /// The backend reported a failed lookup
    #[error("Backend lookup failed: {0}")]
    Backend(#[from] BackendFailure),

    /// The process could not be created at all
    #[error("Failed to start process: {message}")]
    Spawn { message: String },
}

impl RunnerError {
    /// Wrap a spawn-time I/O error
    #[must_use]
    pub fn spawn(err: &std::io::Error) -> Self {
        Self::Spawn {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
