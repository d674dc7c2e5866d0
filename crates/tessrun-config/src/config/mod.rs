//! Configuration management for tessrun
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. Configuration files are TOML with `[engine]`,
//! `[defaults]` and `[variables]` sections.

mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use cli_args::CliArgs;
pub use model::*;
pub use tessrun_utils::types::ConfigSource;

/// Environment variable naming a directory that holds `config.toml`.
pub const HOME_ENV_VAR: &str = "TESSRUN_HOME";

/// Directory searched for upward from the working directory.
pub const CONFIG_DIR_NAME: &str = ".tessrun";

pub const CONFIG_FILE_NAME: &str = "config.toml";
