//! Version-aware command construction for the Tesseract OCR engine.
//!
//! Options are recorded as plain data ([`TesseractOption`]) and resolved
//! against the installed engine version only when a command is rendered, so
//! flag spellings and minimum-version checks live in one place.
//!
//! ```rust
//! use tessrun_command::{CommandModel, EngineVersion, TesseractOption};
//!
//! let mut model = CommandModel::new("page.png");
//! model
//!     .set_use_file_output(false)
//!     .push_option(TesseractOption::lang(["eng", "deu"]))
//!     .push_option(TesseractOption::Psm(6));
//!
//! let version: EngineVersion = "4.1.1".parse().unwrap();
//! let rendered = model.render(&version).unwrap();
//! assert_eq!(rendered.arg_values(), ["page.png", "-", "-l", "eng+deu", "--psm", "6"]);
//! ```

pub mod config_file;
pub mod error;
pub mod escape;
pub mod model;
pub mod option;
pub mod version;

pub use config_file::ConfigFile;
pub use error::CommandError;
pub use escape::{Platform, escape, escape_for};
pub use model::{CommandModel, ImageSource, RenderedCommand, STREAM_PLACEHOLDER, THREAD_LIMIT_VAR};
pub use option::{ArgToken, Fragment, OptionKind, TesseractOption, to_snake_case};
pub use version::{EngineVersion, parse_version_banner};
