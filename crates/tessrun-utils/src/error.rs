//! Error taxonomy with user-friendly reporting
//!
//! Every failure a tessrun operation can surface funnels into
//! [`TessrunError`]. The CLI renders it through [`UserFriendlyError`] and maps
//! it to a process exit code with [`TessrunError::to_exit_code`].

use std::fmt;
use std::path::PathBuf;

use tessrun_command::CommandError;
use tessrun_runner::RunnerError;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Trait for errors that can provide user-friendly messages and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for grouping in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    EngineIntegration,
    EngineExecution,
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::FileSystem => write!(f, "File System"),
            Self::EngineIntegration => write!(f, "Engine Integration"),
            Self::EngineExecution => write!(f, "Engine Execution"),
            Self::Validation => write!(f, "Validation"),
        }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files are TOML with optional [engine], [defaults] and [variables] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => {
                Some(format!("The '{key}' option has specific range requirements."))
            }
            Self::NotFound { .. } | Self::DiscoveryFailed { .. } => Some(
                "tessrun looks for --config, then $TESSRUN_HOME/config.toml, then .tessrun/config.toml upward from the current directory."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Run 'tessrun config' to see which file is being loaded".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "psm" => vec!["Use a page segmentation mode between 0 and 13".to_string()],
                "oem" => vec!["Use an OCR engine mode between 0 and 3".to_string()],
                "thread_limit" => vec!["Use a thread limit of at least 1".to_string()],
                "timeout_secs" => {
                    vec!["Use a timeout of at least 1 second, or remove it to wait indefinitely".to_string()]
                }
                _ => vec![format!("Check the value given for '{key}'")],
            },
            Self::NotFound { path } => vec![
                format!("Create the configuration file at {path}"),
                "Omit --config to use discovery and built-in defaults".to_string(),
            ],
            Self::DiscoveryFailed { .. } => {
                vec!["Pass an explicit file with --config".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

// ============================================================================
// CommandError / RunnerError reporting
// ============================================================================

impl UserFriendlyError for CommandError {
    fn user_message(&self) -> String {
        match self {
            Self::FeatureNotAvailable {
                option,
                required,
                actual,
            } => format!(
                "The '{option}' option needs Tesseract {required} or later, but {actual} is installed"
            ),
            Self::UnknownOption { name } => format!("Unknown engine option '{name}'"),
            Self::InvalidOptionValue { option, value, .. } => {
                format!("Option '{option}' does not accept '{value}'")
            }
            Self::VersionUnparseable { output } => {
                format!("Could not read the Tesseract version from '{output}'")
            }
            Self::TempFile { dir, .. } => {
                format!("Could not create a temporary output file in {}", dir.display())
            }
            Self::Runner(e) => e.user_message(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::FeatureNotAvailable { .. } => Some(
                "Some engine options were introduced in later Tesseract releases.".to_string(),
            ),
            Self::InvalidOptionValue { reason, .. } => Some(reason.clone()),
            Self::VersionUnparseable { .. } => Some(
                "The version is read from the first line printed by 'tesseract --version'."
                    .to_string(),
            ),
            Self::TempFile { reason, .. } => Some(reason.clone()),
            Self::Runner(e) => e.context(),
            Self::UnknownOption { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FeatureNotAvailable { option, .. } => vec![
                "Upgrade Tesseract".to_string(),
                format!("Remove the '{option}' option"),
            ],
            Self::UnknownOption { .. } => vec![
                "Known options: psm, oem, user-words, user-patterns, tessdata-dir, lang"
                    .to_string(),
                "Engine variables are set with --var KEY=VALUE".to_string(),
            ],
            Self::InvalidOptionValue { .. } => {
                vec!["Check 'tesseract --help-extra' for accepted values".to_string()]
            }
            Self::VersionUnparseable { .. } => vec![
                "Check that --executable points at a Tesseract binary".to_string(),
            ],
            Self::TempFile { .. } => vec![
                "Check that the temp directory exists and is writable".to_string(),
                "Choose another directory with --temp-dir".to_string(),
            ],
            Self::Runner(e) => e.suggestions(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::FeatureNotAvailable { .. }
            | Self::UnknownOption { .. }
            | Self::InvalidOptionValue { .. } => ErrorCategory::Validation,
            Self::VersionUnparseable { .. } => ErrorCategory::EngineIntegration,
            Self::TempFile { .. } => ErrorCategory::FileSystem,
            Self::Runner(e) => e.category(),
        }
    }
}

impl UserFriendlyError for RunnerError {
    fn user_message(&self) -> String {
        match self {
            Self::SpawnFailed { program, .. } => format!("Could not launch '{program}'"),
            Self::ExecutionFailed { reason } => format!("Engine process failed: {reason}"),
            Self::InvalidState { operation, state } => {
                format!("Internal error: '{operation}' while the engine process was {state}")
            }
            Self::Timeout { timeout_ms } => {
                format!("The engine did not finish within {timeout_ms} ms")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::SpawnFailed { reason, .. } => Some(reason.clone()),
            Self::Timeout { .. } => {
                Some("The engine process group was terminated after the timeout.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SpawnFailed { .. } => vec![
                "Check that Tesseract is installed and on PATH".to_string(),
                "Point --executable at the Tesseract binary".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase --timeout or engine.timeout_secs".to_string(),
                "Try a smaller image or a simpler page segmentation mode".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::SpawnFailed { .. } => ErrorCategory::EngineIntegration,
            _ => ErrorCategory::EngineExecution,
        }
    }
}

// ============================================================================
// TessrunError
// ============================================================================

/// Every failure surfaced by a tessrun operation.
///
/// `Display` produces the full diagnostic, including the generated command
/// line where one exists.
#[derive(Error, Debug)]
pub enum TessrunError {
    #[error("Error! The image \"{}\" was not found.", path.display())]
    ImageNotFound { path: PathBuf },

    #[error("Error! The command \"{executable}\" was not found.")]
    ExecutableNotFound { executable: String },

    #[error(
        "Error! The command did not produce any output.\n\nGenerated command:\n{command}\n\nReturned message:\n{stderr}"
    )]
    UnsuccessfulCommand { command: String, stderr: String },

    #[error("Error! The command could not be launched.\n\nGenerated command:\n{command}")]
    ProcessCreation { command: String, reason: String },

    #[error(
        "Error! {action} is not available in this Tesseract version\nRequired version is {required}, actual version is {actual}\n\nGenerated command:\n{command}"
    )]
    FeatureNotAvailable {
        action: String,
        required: String,
        actual: String,
        command: String,
    },

    #[error("Error! No permission to write to {}", path.display())]
    NoWritePermission { path: PathBuf },

    #[error("Error! The command timed out after {timeout_ms} ms.\n\nGenerated command:\n{command}")]
    Timeout { command: String, timeout_ms: u64 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UserFriendlyError for TessrunError {
    fn user_message(&self) -> String {
        match self {
            Self::ImageNotFound { path } => format!("Image not found: {}", path.display()),
            Self::ExecutableNotFound { executable } => {
                format!("Tesseract executable '{executable}' was not found")
            }
            Self::UnsuccessfulCommand { .. } => {
                "The engine finished without producing any output".to_string()
            }
            Self::ProcessCreation { reason, .. } => {
                format!("The engine could not be launched: {reason}")
            }
            Self::FeatureNotAvailable {
                action,
                required,
                actual,
                ..
            } => format!("{action} needs Tesseract {required} or later, but {actual} is installed"),
            Self::NoWritePermission { path } => {
                format!("No permission to write to {}", path.display())
            }
            Self::Timeout { timeout_ms, .. } => {
                format!("The engine did not finish within {timeout_ms} ms")
            }
            Self::Config(e) => e.user_message(),
            Self::Command(e) => e.user_message(),
            Self::Runner(e) => e.user_message(),
            Self::Io(e) => format!("I/O error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ImageNotFound { .. } => std::env::current_dir()
                .ok()
                .map(|dir| format!("The current directory is {}", dir.display())),
            Self::ExecutableNotFound { .. } => Some(format!(
                "The current $PATH is {}",
                std::env::var("PATH").unwrap_or_default()
            )),
            Self::UnsuccessfulCommand { command, stderr } => {
                let stderr = stderr.trim_end();
                if stderr.is_empty() {
                    Some(format!("Generated command: {command}"))
                } else {
                    Some(format!("Generated command: {command}\nEngine said: {stderr}"))
                }
            }
            Self::ProcessCreation { command, .. } | Self::Timeout { command, .. } => {
                Some(format!("Generated command: {command}"))
            }
            Self::FeatureNotAvailable { command, .. } => Some(format!(
                "Reading from stdin and writing to stdout need Tesseract 3.03-rc1 or later.\nGenerated command: {command}"
            )),
            Self::NoWritePermission { .. } => None,
            Self::Config(e) => e.context(),
            Self::Command(e) => e.context(),
            Self::Runner(e) => e.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ImageNotFound { .. } => vec![
                "Check the image path; relative paths resolve from the current directory"
                    .to_string(),
            ],
            Self::ExecutableNotFound { .. } => vec![
                "Make sure you have Tesseract OCR installed: https://github.com/tesseract-ocr/tesseract"
                    .to_string(),
                "Point --executable or engine.executable at the binary".to_string(),
            ],
            Self::UnsuccessfulCommand { .. } => vec![
                "Check that the image is readable by Tesseract".to_string(),
                "Verify the requested languages are installed with 'tessrun langs'".to_string(),
            ],
            Self::ProcessCreation { .. } => vec![
                "Check that the executable has execute permission".to_string(),
            ],
            Self::FeatureNotAvailable { .. } => vec![
                "Upgrade Tesseract".to_string(),
                "Use file input and output instead".to_string(),
            ],
            Self::NoWritePermission { .. } => vec![
                "Make sure you have the right output file and permissions to write to the folder"
                    .to_string(),
            ],
            Self::Timeout { .. } => vec!["Increase --timeout or engine.timeout_secs".to_string()],
            Self::Config(e) => e.suggestions(),
            Self::Command(e) => e.suggestions(),
            Self::Runner(e) => e.suggestions(),
            Self::Io(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ImageNotFound { .. } | Self::NoWritePermission { .. } | Self::Io(_) => {
                ErrorCategory::FileSystem
            }
            Self::ExecutableNotFound { .. } | Self::ProcessCreation { .. } => {
                ErrorCategory::EngineIntegration
            }
            Self::UnsuccessfulCommand { .. } | Self::Timeout { .. } => {
                ErrorCategory::EngineExecution
            }
            Self::FeatureNotAvailable { .. } => ErrorCategory::Validation,
            Self::Config(e) => e.category(),
            Self::Command(e) => e.category(),
            Self::Runner(e) => e.category(),
        }
    }
}

impl TessrunError {
    /// Message, context and suggestions formatted for a terminal.
    ///
    /// ```rust
    /// use tessrun_utils::TessrunError;
    ///
    /// let err = TessrunError::ExecutableNotFound { executable: "tesseract".into() };
    /// let message = err.display_for_user();
    /// assert!(message.starts_with("Error: Tesseract executable 'tesseract' was not found"));
    /// assert!(message.contains("Suggestions:"));
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::ImageNotFound { .. } => ExitCode::IMAGE_NOT_FOUND,
            Self::ExecutableNotFound { .. } => ExitCode::EXECUTABLE_NOT_FOUND,
            Self::FeatureNotAvailable { .. } => ExitCode::FEATURE_UNAVAILABLE,
            Self::NoWritePermission { .. } => ExitCode::NO_WRITE_PERMISSION,
            Self::Timeout { .. } => ExitCode::TIMEOUT,
            Self::UnsuccessfulCommand { .. } | Self::ProcessCreation { .. } => {
                ExitCode::ENGINE_FAILURE
            }
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Command(e) => command_exit_code(e),
            Self::Runner(e) => runner_exit_code(e),
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

fn command_exit_code(error: &CommandError) -> ExitCode {
    match error {
        CommandError::FeatureNotAvailable { .. } => ExitCode::FEATURE_UNAVAILABLE,
        CommandError::UnknownOption { .. } | CommandError::InvalidOptionValue { .. } => {
            ExitCode::CLI_ARGS
        }
        CommandError::VersionUnparseable { .. } => ExitCode::ENGINE_FAILURE,
        CommandError::TempFile { .. } => ExitCode::INTERNAL,
        CommandError::Runner(e) => runner_exit_code(e),
    }
}

fn runner_exit_code(error: &RunnerError) -> ExitCode {
    match error {
        RunnerError::Timeout { .. } => ExitCode::TIMEOUT,
        RunnerError::InvalidState { .. } => ExitCode::INTERNAL,
        RunnerError::SpawnFailed { .. } | RunnerError::ExecutionFailed { .. } => {
            ExitCode::ENGINE_FAILURE
        }
    }
}
