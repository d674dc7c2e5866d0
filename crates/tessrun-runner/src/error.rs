//! Error types for runner module

use thiserror::Error;

use crate::handle::ProcessState;

/// Child process execution errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn process '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Process execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Operation '{operation}' is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ProcessState,
    },

    #[error("Execution timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}
