//! Exit code constants for the `tessrun` binary.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `IMAGE_NOT_FOUND` | Input image does not exist |
//! | 4 | `EXECUTABLE_NOT_FOUND` | Engine executable not found |
//! | 5 | `FEATURE_UNAVAILABLE` | Installed engine too old for a requested feature |
//! | 6 | `NO_WRITE_PERMISSION` | Output file cannot be written |
//! | 10 | `TIMEOUT` | Engine run exceeded the configured timeout |
//! | 70 | `ENGINE_FAILURE` | Engine could not start or produced no output |

/// Process exit code.
///
/// The numeric values are part of the CLI contract.
///
/// ```rust
/// use tessrun_utils::ExitCode;
///
/// assert_eq!(ExitCode::IMAGE_NOT_FOUND.as_i32(), 3);
/// assert_eq!(ExitCode::from_i32(70), ExitCode::ENGINE_FAILURE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid or conflicting command-line arguments or configuration values
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    pub const IMAGE_NOT_FOUND: ExitCode = ExitCode(3);

    pub const EXECUTABLE_NOT_FOUND: ExitCode = ExitCode(4);

    /// The installed engine is older than a requested option requires
    pub const FEATURE_UNAVAILABLE: ExitCode = ExitCode(5);

    pub const NO_WRITE_PERMISSION: ExitCode = ExitCode(6);

    pub const TIMEOUT: ExitCode = ExitCode(10);

    /// The engine failed to start or finished without output
    pub const ENGINE_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::IMAGE_NOT_FOUND.as_i32(), 3);
        assert_eq!(ExitCode::EXECUTABLE_NOT_FOUND.as_i32(), 4);
        assert_eq!(ExitCode::FEATURE_UNAVAILABLE.as_i32(), 5);
        assert_eq!(ExitCode::NO_WRITE_PERMISSION.as_i32(), 6);
        assert_eq!(ExitCode::TIMEOUT.as_i32(), 10);
        assert_eq!(ExitCode::ENGINE_FAILURE.as_i32(), 70);
    }

    #[test]
    fn test_exit_code_conversions() {
        let raw: i32 = ExitCode::TIMEOUT.into();
        assert_eq!(raw, 10);
        assert_eq!(ExitCode::from(6), ExitCode::NO_WRITE_PERMISSION);
    }
}
