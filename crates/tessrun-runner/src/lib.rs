//! Child process execution for the OCR engine.
//!
//! Runs exactly one child process per invocation, synchronously, to
//! completion. Stdout and stderr are serviced concurrently with stdin and with
//! the exit wait, so no pipe can fill up and stall the child.
//!
//! # Security Model
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style invocation.
//! This prevents shell injection attacks by ensuring arguments are passed as discrete
//! elements rather than shell strings.

pub mod command_spec;
pub mod error;
pub mod handle;
pub mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use handle::{Captured, ProcessHandle, ProcessState};
pub use process::{NativeRunner, ProcessOutput, ProcessRunner};
