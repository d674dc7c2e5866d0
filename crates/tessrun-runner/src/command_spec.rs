use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

// ============================================================================
// CommandSpec - argv-style process specification
// ============================================================================

/// Specification for a command to execute.
///
/// All engine invocations go through this type so that arguments reach the
/// child as discrete argv elements. Nothing here is ever handed to a shell:
/// file names containing spaces, quotes or `$` arrive byte-for-byte.
///
/// # Example
///
/// ```rust
/// use tessrun_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("tesseract")
///     .arg("scan 01.png")
///     .arg("-")
///     .args(["-l", "eng"])
///     .env("OMP_THREAD_LIMIT", "1");
///
/// assert_eq!(cmd.program, OsString::from("tesseract"));
/// assert_eq!(cmd.args.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Environment overrides, applied on top of the inherited environment
    pub env: BTreeMap<OsString, OsString>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command, preserving their order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the child.
    ///
    /// Setting the same key twice keeps the last value.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Program name as a lossy UTF-8 string, for logs and error messages.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Iterate over the argv tail as `&OsStr`.
    pub fn arg_iter(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    /// Build a `tokio::process::Command` with all three standard streams piped.
    ///
    /// On Unix the child is placed in its own process group so a timeout can
    /// signal the engine together with anything it forked.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}
