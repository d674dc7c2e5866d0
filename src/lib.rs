//! tessrun - drive the Tesseract OCR engine as a child process
//!
//! tessrun builds version-aware Tesseract command lines, runs the engine with
//! deadlock-free handling of stdin, stdout and stderr, and reports failures
//! with the exact command line that was executed.
//!
//! tessrun can be used in two ways:
//! - **CLI**: Install via `cargo install tessrun` and run from command line
//! - **Library**: Add as a dependency and use [`Tesseract`]
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Recognise a page
//! tessrun ocr scan.png --lang eng --psm 6
//!
//! # Stream the image over stdin and read the result from stdout
//! tessrun ocr scan.png --stdin --stdout
//!
//! # Show the command line without running recognition
//! tessrun ocr scan.png --lang eng --dry-run
//!
//! # Engine information
//! tessrun version --json
//! tessrun langs
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use tessrun::Tesseract;
//!
//! let text = Tesseract::new("scan.png").lang(["eng"]).psm(6).run()?;
//! # Ok::<(), tessrun::TessrunError>(())
//! ```
//!
//! # Crate Layout
//!
//! - [`tessrun_runner`] - one child process per invocation, multiplexed pipes
//! - [`tessrun_command`] - options, version gating, rendering and escaping
//! - [`tessrun_config`] - layered TOML configuration
//! - [`tessrun_utils`] - errors, exit codes, logging
//!
//! This crate adds the run sequence ([`Tesseract`]), the pre/post checks
//! ([`checks`]), temp file cleanup ([`artifacts`]) and the CLI ([`cli`]).

pub mod artifacts;
pub mod checks;
pub mod cli;
mod ocr;

pub use ocr::Tesseract;

pub use tessrun_command::{
    CommandError, CommandModel, ConfigFile, EngineVersion, RenderedCommand, TesseractOption,
    escape,
};
pub use tessrun_config::{CliArgs, Config};
pub use tessrun_runner::{NativeRunner, ProcessOutput, ProcessRunner, RunnerError};
pub use tessrun_utils::{ConfigError, ErrorCategory, ExitCode, TessrunError, UserFriendlyError};
