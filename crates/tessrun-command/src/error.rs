//! Error types for command construction

use std::path::PathBuf;

use tessrun_runner::RunnerError;
use thiserror::Error;

/// Errors raised while building an engine command line.
///
/// Everything here is detected before the recognition process is spawned.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(
        "{option} option is only available on Tesseract {required} or later.\nYour version of Tesseract is {actual}"
    )]
    FeatureNotAvailable {
        option: String,
        required: String,
        actual: String,
    },

    #[error("Unknown option '{name}'")]
    UnknownOption { name: String },

    #[error("Invalid value '{value}' for option '{option}': {reason}")]
    InvalidOptionValue {
        option: String,
        value: String,
        reason: String,
    },

    #[error("Could not determine the Tesseract version from '{output}'")]
    VersionUnparseable { output: String },

    #[error("Failed to create temporary output file in {}: {reason}", dir.display())]
    TempFile { dir: PathBuf, reason: String },

    #[error(transparent)]
    Runner(#[from] RunnerError),
}
