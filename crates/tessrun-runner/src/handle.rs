//! Child process handle with multiplexed pipe I/O.
//!
//! A [`ProcessHandle`] walks through `Created → Running → Exited → Closed`.
//! All pipe traffic is driven by a private current-thread tokio runtime, so
//! the public API stays synchronous and runs entirely on the caller's thread.
//!
//! # Deadlock avoidance
//!
//! A child that fills one pipe while we block on another stalls forever. Both
//! [`ProcessHandle::write`] and [`ProcessHandle::wait`] therefore multiplex over
//! every open pipe with `tokio::select!`: stdout and stderr are read as soon as
//! they have data, while stdin is being fed and while we wait for the exit.
//! Once the exit is observed, a final drain pass collects whatever the child
//! wrote between the last read and its termination.

use std::fmt;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::command_spec::CommandSpec;
use crate::error::RunnerError;

const READ_CHUNK: usize = 8192;

/// Upper bound for the post-exit drain. A descendant that inherited the pipes
/// can keep them open after the engine itself is gone.
const FINAL_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Time between SIGTERM and SIGKILL when a timeout fires.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Lifecycle state of a [`ProcessHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Command prepared, nothing spawned yet
    Created,
    /// Child started, pipes connected
    Running,
    /// Child terminated; pipes may still hold unread bytes
    Exited,
    /// Pipes released and child reaped
    Closed,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Exited => write!(f, "exited"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Bytes collected from the child's stdout and stderr.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Exclusive owner of one child process and its three pipes.
pub struct ProcessHandle {
    spec: CommandSpec,
    state: ProcessState,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    captured: Captured,
    status: Option<ExitStatus>,
    // Declared last so the pipes above are dropped while the reactor exists.
    runtime: Runtime,
}

impl ProcessHandle {
    /// Prepare a handle for `spec` without starting anything.
    pub fn new(spec: CommandSpec) -> Result<Self, RunnerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RunnerError::ExecutionFailed {
                reason: format!("Failed to start I/O runtime: {e}"),
            })?;

        Ok(Self {
            spec,
            state: ProcessState::Created,
            child: None,
            stdin: None,
            stdout: None,
            stderr: None,
            captured: Captured::default(),
            status: None,
            runtime,
        })
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[must_use]
    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// OS process id while the child has not been reaped.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Start the child with piped stdin, stdout and stderr.
    ///
    /// A refusal by the OS (missing executable, permission denied) is reported
    /// as [`RunnerError::SpawnFailed`] and never retried.
    pub fn spawn(&mut self) -> Result<(), RunnerError> {
        if self.state != ProcessState::Created {
            return Err(RunnerError::InvalidState {
                operation: "spawn",
                state: self.state,
            });
        }

        let mut command = self.spec.to_tokio_command();
        let _guard = self.runtime.enter();
        let mut child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: self.spec.program_name(),
            reason: e.to_string(),
        })?;

        self.stdin = child.stdin.take();
        self.stdout = child.stdout.take();
        self.stderr = child.stderr.take();
        debug!(
            program = %self.spec.program_name(),
            pid = ?child.id(),
            "Spawned child process"
        );
        self.child = Some(child);
        self.state = ProcessState::Running;
        Ok(())
    }

    /// Feed `data[..len]` to the child's stdin.
    ///
    /// Partial writes are retried with an advancing offset until `len` bytes
    /// are accepted, a write makes no progress, or the pipe errors. Output
    /// pipes keep being drained meanwhile. Returns whether exactly `len`
    /// bytes were delivered; a `len` beyond `data.len()` can never succeed.
    pub fn write(&mut self, data: &[u8], len: usize) -> bool {
        matches!(self.write_within(data, len, None), Ok(true))
    }

    /// [`write`](Self::write) bounded by `timeout`.
    ///
    /// A child that stops reading stdin and never exits would block the feed
    /// forever. When `timeout` elapses first, the child is terminated and
    /// reaped, the handle moves to `Exited`, and [`RunnerError::Timeout`] is
    /// returned.
    pub fn write_within(
        &mut self,
        data: &[u8],
        len: usize,
        timeout: Option<Duration>,
    ) -> Result<bool, RunnerError> {
        if self.state != ProcessState::Running {
            warn!(state = %self.state, "Refusing to write to a child that is not running");
            return Ok(false);
        }

        let payload = &data[..len.min(data.len())];
        let Self {
            runtime,
            child,
            stdin,
            stdout,
            stderr,
            captured,
            status,
            state,
            ..
        } = self;
        let Some(pipe) = stdin.as_mut() else {
            warn!("Refusing to write after stdin was closed");
            return Ok(false);
        };

        let fed = runtime.block_on(async {
            match timeout {
                Some(limit) => {
                    tokio::time::timeout(limit, feed(pipe, payload, stdout, stderr, captured))
                        .await
                        .ok()
                }
                None => Some(feed(pipe, payload, stdout, stderr, captured).await),
            }
        });

        let Some(written) = fed else {
            stdin.take();
            if let Some(proc) = child.as_mut() {
                runtime.block_on(async {
                    terminate(proc).await;
                    final_drain(stdout, stderr, captured).await;
                });
                *status = proc.try_wait().ok().flatten();
            }
            *state = ProcessState::Exited;
            return Err(timed_out(timeout.unwrap_or_default()));
        };

        debug!(written, expected = len, "Finished writing to child stdin");
        if written != len {
            warn!(written, expected = len, "Child stdin accepted only part of the input");
        }
        Ok(written == len)
    }

    /// Close stdin so children that read until EOF can proceed.
    pub fn close_stdin(&mut self) {
        if self.stdin.take().is_some() {
            debug!("Closed child stdin");
        }
    }

    /// Collect stdout and stderr until the child exits.
    ///
    /// Without a timeout this waits as long as the child lives. With one, an
    /// overdue child is terminated, reaped, and [`RunnerError::Timeout`] is
    /// returned. The captured bytes are moved out of the handle.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<Captured, RunnerError> {
        match self.state {
            ProcessState::Running => {}
            ProcessState::Exited => return Ok(std::mem::take(&mut self.captured)),
            state => {
                return Err(RunnerError::InvalidState {
                    operation: "wait",
                    state,
                });
            }
        }

        let Self {
            runtime,
            child,
            stdout,
            stderr,
            captured,
            status,
            state,
            ..
        } = self;
        let Some(proc) = child.as_mut() else {
            return Err(RunnerError::InvalidState {
                operation: "wait",
                state: *state,
            });
        };

        let outcome = runtime.block_on(drive_to_exit(proc, stdout, stderr, captured, timeout));

        *state = ProcessState::Exited;
        match outcome? {
            Some(exit) => {
                debug!(code = ?exit.code(), "Child exited");
                *status = Some(exit);
                Ok(std::mem::take(captured))
            }
            None => {
                *status = proc.try_wait().ok().flatten();
                Err(timed_out(timeout.unwrap_or_default()))
            }
        }
    }

    /// Close stdin, drain and drop the output pipes, and reap the child.
    ///
    /// Consumes the handle, so a handle is closed exactly once. Returns the
    /// exit code, or `None` when the child was never spawned or died from a
    /// signal.
    pub fn close(mut self) -> Result<Option<i32>, RunnerError> {
        self.close_stdin();
        if self.state == ProcessState::Created {
            self.state = ProcessState::Closed;
            return Ok(None);
        }

        let Self {
            runtime,
            child,
            stdout,
            stderr,
            captured,
            status,
            state,
            ..
        } = &mut self;

        if let Some(proc) = child.as_mut() {
            let reaped = runtime.block_on(drain_and_reap(proc, stdout, stderr, captured));
            let exit = reaped.map_err(|e| RunnerError::ExecutionFailed {
                reason: format!("Failed to reap child process: {e}"),
            })?;
            *status = Some(exit);
        }

        *state = ProcessState::Closed;
        let code = (*status).and_then(|s| s.code());
        debug!(code = ?code, "Closed child process");
        Ok(code)
    }
}

fn timed_out(limit: Duration) -> RunnerError {
    warn!(timeout_ms = limit.as_millis(), "Child timed out and was terminated");
    RunnerError::Timeout {
        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }
}

/// Write `payload` while servicing both output pipes.
async fn feed(
    stdin: &mut ChildStdin,
    payload: &[u8],
    stdout: &mut Option<ChildStdout>,
    stderr: &mut Option<ChildStderr>,
    captured: &mut Captured,
) -> usize {
    let mut offset = 0;
    let mut out_chunk = vec![0u8; READ_CHUNK];
    let mut err_chunk = vec![0u8; READ_CHUNK];

    while offset < payload.len() {
        tokio::select! {
            res = stdin.write(&payload[offset..]) => match res {
                Ok(0) => break,
                Ok(n) => offset += n,
                Err(e) => {
                    debug!(error = %e, offset, "Write to child stdin failed");
                    break;
                }
            },
            res = read_chunk(stdout, &mut out_chunk) => {
                absorb(res, stdout, &out_chunk, &mut captured.stdout, "stdout");
            }
            res = read_chunk(stderr, &mut err_chunk) => {
                absorb(res, stderr, &err_chunk, &mut captured.stderr, "stderr");
            }
        }
    }

    offset
}

async fn pump_until_exit(
    child: &mut Child,
    stdout: &mut Option<ChildStdout>,
    stderr: &mut Option<ChildStderr>,
    captured: &mut Captured,
) -> Result<ExitStatus, RunnerError> {
    let mut out_chunk = vec![0u8; READ_CHUNK];
    let mut err_chunk = vec![0u8; READ_CHUNK];

    loop {
        tokio::select! {
            res = read_chunk(stdout, &mut out_chunk) => {
                absorb(res, stdout, &out_chunk, &mut captured.stdout, "stdout");
            }
            res = read_chunk(stderr, &mut err_chunk) => {
                absorb(res, stderr, &err_chunk, &mut captured.stderr, "stderr");
            }
            res = child.wait() => {
                return res.map_err(|e| RunnerError::ExecutionFailed {
                    reason: format!("Failed to wait for child process: {e}"),
                });
            }
        }
    }
}

/// Pump until exit, terminating the child if `timeout` elapses first.
///
/// `Ok(None)` means the child was killed for running too long.
async fn drive_to_exit(
    child: &mut Child,
    stdout: &mut Option<ChildStdout>,
    stderr: &mut Option<ChildStderr>,
    captured: &mut Captured,
    timeout: Option<Duration>,
) -> Result<Option<ExitStatus>, RunnerError> {
    let exited = match timeout {
        Some(limit) => tokio::time::timeout(limit, pump_until_exit(child, stdout, stderr, captured))
            .await
            .ok(),
        None => Some(pump_until_exit(child, stdout, stderr, captured).await),
    };

    match exited {
        Some(Ok(exit)) => {
            final_drain(stdout, stderr, captured).await;
            Ok(Some(exit))
        }
        Some(Err(e)) => Err(e),
        None => {
            terminate(child).await;
            final_drain(stdout, stderr, captured).await;
            Ok(None)
        }
    }
}

async fn drain_and_reap(
    child: &mut Child,
    stdout: &mut Option<ChildStdout>,
    stderr: &mut Option<ChildStderr>,
    captured: &mut Captured,
) -> io::Result<ExitStatus> {
    final_drain(stdout, stderr, captured).await;
    stdout.take();
    stderr.take();
    child.wait().await
}

/// Read both pipes until EOF, bounded by [`FINAL_DRAIN_GRACE`].
async fn final_drain(
    stdout: &mut Option<ChildStdout>,
    stderr: &mut Option<ChildStderr>,
    captured: &mut Captured,
) {
    let drained =
        tokio::time::timeout(FINAL_DRAIN_GRACE, drain_to_eof(stdout, stderr, captured)).await;
    if drained.is_err() {
        debug!("Output pipes still open after child exit; a descendant may hold them");
    }
}

async fn drain_to_eof(
    stdout: &mut Option<ChildStdout>,
    stderr: &mut Option<ChildStderr>,
    captured: &mut Captured,
) {
    let mut out_chunk = vec![0u8; READ_CHUNK];
    let mut err_chunk = vec![0u8; READ_CHUNK];

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            res = read_chunk(stdout, &mut out_chunk) => {
                absorb(res, stdout, &out_chunk, &mut captured.stdout, "stdout");
            }
            res = read_chunk(stderr, &mut err_chunk) => {
                absorb(res, stderr, &err_chunk, &mut captured.stderr, "stderr");
            }
        }
    }
}

/// Read one chunk; a closed pipe never becomes ready.
async fn read_chunk<R: AsyncRead + Unpin>(pipe: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize> {
    match pipe.as_mut() {
        Some(reader) => reader.read(buf).await,
        None => std::future::pending().await,
    }
}

fn absorb<R>(
    res: io::Result<usize>,
    pipe: &mut Option<R>,
    chunk: &[u8],
    sink: &mut Vec<u8>,
    stream: &'static str,
) {
    match res {
        Ok(0) => {
            debug!(stream, "Reached EOF");
            *pipe = None;
        }
        Ok(n) => sink.extend_from_slice(&chunk[..n]),
        Err(e) => {
            warn!(stream, error = %e, "Read from child pipe failed; closing it");
            *pipe = None;
        }
    }
}

/// Terminate an overdue child and reap it.
///
/// On Unix the whole process group gets SIGTERM, then SIGKILL after
/// [`TERMINATE_GRACE`].
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::Signal;

        if signal_group(child, Signal::SIGTERM)
            && tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok()
        {
            return;
        }
        signal_group(child, Signal::SIGKILL);
    }

    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Kill request failed; child may already be gone");
    }
    if let Err(e) = child.wait().await {
        warn!(error = %e, "Failed to reap terminated child");
    }
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: nix::sys::signal::Signal) -> bool {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match killpg(Pid::from_raw(raw), signal) {
        Ok(()) => true,
        Err(e) => {
            debug!(pid, ?signal, error = %e, "killpg failed");
            false
        }
    }
}
