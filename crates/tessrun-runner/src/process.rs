use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::command_spec::CommandSpec;
use crate::error::RunnerError;
use crate::handle::ProcessHandle;

// ============================================================================
// ProcessRunner Trait - one child process per invocation
// ============================================================================

/// Output from a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
    /// Whether every byte of the provided stdin payload was accepted
    pub input_complete: bool,
}

impl ProcessOutput {
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            input_complete: true,
        }
    }

    #[must_use]
    pub fn with_input_complete(mut self, input_complete: bool) -> Self {
        self.input_complete = input_complete;
        self
    }

    /// Get stdout as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Check if the process exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for running a single child process to completion.
///
/// Implementations MUST use argv-style APIs only (no shell string evaluation)
/// and MUST NOT expose async in the public API. A blocking read on one output
/// stream must never starve the other, and stdin is closed only after the
/// whole payload was accepted or writing failed.
///
/// # Example
///
/// ```rust
/// use tessrun_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError};
/// use std::time::Duration;
///
/// struct CannedRunner;
///
/// impl ProcessRunner for CannedRunner {
///     fn run(
///         &self,
///         _cmd: &CommandSpec,
///         _stdin: Option<&[u8]>,
///         _timeout: Option<Duration>,
///     ) -> Result<ProcessOutput, RunnerError> {
///         Ok(ProcessOutput::new(b"tesseract 4.1.1\n".to_vec(), Vec::new(), Some(0)))
///     }
/// }
///
/// let output = CannedRunner
///     .run(&CommandSpec::new("tesseract").arg("--version"), None, None)
///     .unwrap();
/// assert!(output.success());
/// ```
pub trait ProcessRunner {
    /// Execute `cmd`, feed it `stdin` if given, and collect its output.
    ///
    /// * `Ok(ProcessOutput)` - the process completed (possibly with non-zero exit code)
    /// * `Err(RunnerError::SpawnFailed)` - the OS refused to start it
    /// * `Err(RunnerError::Timeout)` - `timeout` elapsed and the process was killed
    fn run(
        &self,
        cmd: &CommandSpec,
        stdin: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError>;
}

// ============================================================================
// NativeRunner - ProcessHandle-backed execution
// ============================================================================

/// Native process runner.
///
/// Drives one [`ProcessHandle`] through spawn, stdin feed, drain-and-wait and
/// close on the calling thread.
///
/// ```rust,no_run
/// use tessrun_runner::{CommandSpec, NativeRunner, ProcessRunner};
///
/// let cmd = CommandSpec::new("tesseract").args(["-", "-", "-l", "eng"]);
/// let image = std::fs::read("scan.png").unwrap();
/// let output = NativeRunner::new().run(&cmd, Some(&image), None).unwrap();
/// println!("{}", output.stdout_string());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for NativeRunner {
    fn run(
        &self,
        cmd: &CommandSpec,
        stdin: Option<&[u8]>,
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, RunnerError> {
        let started = Instant::now();
        let mut handle = ProcessHandle::new(cmd.clone())?;
        handle.spawn()?;

        // One deadline covers feeding stdin and waiting for the exit
        let input_complete = match stdin {
            Some(payload) => handle.write_within(payload, payload.len(), timeout)?,
            None => true,
        };
        handle.close_stdin();
        if !input_complete {
            warn!(
                program = %cmd.program_name(),
                "Child did not accept the full stdin payload"
            );
        }

        let remaining = timeout.map(|limit| limit.saturating_sub(started.elapsed()));
        let captured = handle.wait(remaining).map_err(|e| match (e, timeout) {
            (RunnerError::Timeout { .. }, Some(limit)) => RunnerError::Timeout {
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            },
            (other, _) => other,
        })?;
        let exit_code = handle.close()?;

        debug!(
            program = %cmd.program_name(),
            exit_code = ?exit_code,
            stdout_bytes = captured.stdout.len(),
            stderr_bytes = captured.stderr.len(),
            duration_ms = started.elapsed().as_millis(),
            "Process finished"
        );

        Ok(ProcessOutput::new(captured.stdout, captured.stderr, exit_code)
            .with_input_complete(input_complete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_output_new() {
        let output = ProcessOutput::new(b"text".to_vec(), b"warning".to_vec(), Some(0));
        assert_eq!(output.stdout, b"text");
        assert_eq!(output.stderr, b"warning");
        assert_eq!(output.exit_code, Some(0));
        assert!(output.input_complete);
    }

    #[test]
    fn test_process_output_success() {
        assert!(ProcessOutput::new(Vec::new(), Vec::new(), Some(0)).success());
        assert!(!ProcessOutput::new(Vec::new(), Vec::new(), Some(1)).success());
        // Killed by signal
        assert!(!ProcessOutput::new(Vec::new(), Vec::new(), None).success());
    }

    #[test]
    fn test_process_output_lossy_utf8() {
        let invalid_utf8 = vec![0xff, 0xfe, 0x00, 0x01];
        let output = ProcessOutput::new(invalid_utf8.clone(), invalid_utf8, Some(0));
        assert!(!output.stdout_string().is_empty());
        assert!(!output.stderr_string().is_empty());
    }

    #[test]
    fn test_process_output_input_complete_flag() {
        let output = ProcessOutput::default().with_input_complete(false);
        assert!(!output.input_complete);
    }

    #[test]
    fn test_native_runner_spawn_failure() {
        let cmd = CommandSpec::new("definitely-not-an-ocr-engine-4f1c");
        let err = NativeRunner::new().run(&cmd, None, None).unwrap_err();
        assert!(matches!(err, RunnerError::SpawnFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_round_trips_stdin() {
        let output = NativeRunner::new()
            .run(&CommandSpec::new("cat"), Some(b"image bytes"), None)
            .unwrap();
        assert!(output.success());
        assert!(output.input_complete);
        assert_eq!(output.stdout, b"image bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_passes_env() {
        let cmd = CommandSpec::new("sh")
            .args(["-c", "printf \"$OMP_THREAD_LIMIT\""])
            .env("OMP_THREAD_LIMIT", "2");
        let output = NativeRunner::new().run(&cmd, None, None).unwrap();
        assert_eq!(output.stdout_string(), "2");
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_keeps_stderr_and_exit_code() {
        let cmd = CommandSpec::new("sh").args(["-c", "echo 'Error in pixReadStream' >&2; exit 1"]);
        let output = NativeRunner::new().run(&cmd, None, None).unwrap();
        assert_eq!(output.exit_code, Some(1));
        assert_eq!(output.stderr_string(), "Error in pixReadStream\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_timeout() {
        let cmd = CommandSpec::new("sleep").arg("30");
        let err = NativeRunner::new()
            .run(&cmd, None, Some(Duration::from_millis(100)))
            .unwrap_err();
        assert!(matches!(err, RunnerError::Timeout { timeout_ms: 100 }));
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_timeout_covers_stdin_feed() {
        // sleep never drains stdin, so the feed itself stalls
        let payload = vec![b'x'; 1 << 20];
        let cmd = CommandSpec::new("sleep").arg("30");

        let started = Instant::now();
        let err = NativeRunner::new()
            .run(&cmd, Some(&payload), Some(Duration::from_millis(300)))
            .unwrap_err();
        assert!(matches!(err, RunnerError::Timeout { timeout_ms: 300 }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_timeout_reports_full_limit_after_feed() {
        // The feed finishes at once; the wait then runs out of the remaining time
        let cmd = CommandSpec::new("sh").args(["-c", "cat >/dev/null; sleep 30"]);
        let err = NativeRunner::new()
            .run(&cmd, Some(b"page"), Some(Duration::from_millis(400)))
            .unwrap_err();
        assert!(matches!(err, RunnerError::Timeout { timeout_ms: 400 }));
    }

    #[cfg(unix)]
    #[test]
    fn test_native_runner_child_ignoring_stdin() {
        // The child exits without reading; the write may fail but the run completes
        let payload = vec![b'x'; 1024 * 1024];
        let cmd = CommandSpec::new("sh").args(["-c", "exit 0"]);
        let output = NativeRunner::new().run(&cmd, Some(&payload), None).unwrap();
        assert_eq!(output.exit_code, Some(0));
    }
}
