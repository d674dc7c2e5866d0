//! Foundation utilities for tessrun: the user-facing error taxonomy, process
//! exit codes and tracing initialisation.

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

pub use error::{ConfigError, ErrorCategory, TessrunError, UserFriendlyError};
pub use exit_codes::ExitCode;
pub use types::ConfigSource;
