//! Configuration model, discovery and validation for tessrun.

pub mod config;

pub use config::{CliArgs, Config, ConfigSource, Defaults, EngineConfig};
