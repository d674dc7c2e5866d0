use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use tessrun_utils::ConfigError;
use tracing::debug;

use super::model::TomlConfig;
use super::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, CliArgs, Config, ConfigSource, HOME_ENV_VAR};

/// Overwrite `slot` when `value` is present and record where it came from.
fn apply<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if value.is_some() {
        *slot = value;
        attribution.insert(key.to_string(), source);
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for the upward file search.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("Failed to get current directory: {e}"),
        })?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// Honours `$TESSRUN_HOME`.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let home = env::var_os(HOME_ENV_VAR).map(PathBuf::from);
        Self::discover_with_home(start_dir, home.as_deref(), cli_args)
    }

    /// Path-driven variant of [`Config::discover_from`] that takes the home
    /// directory explicitly, so tests never touch process-global state.
    pub fn discover_with_home(
        start_dir: &Path,
        home: Option<&Path>,
        cli_args: &CliArgs,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir, home),
        };

        if let Some(path) = &config_path {
            debug!(path = %path.display(), "Loading configuration file");
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config);
            config.config_path = Some(path.clone());
        }

        config.apply_cli(cli_args);
        config.validate()?;
        Ok(config)
    }

    /// Find a config file: `$TESSRUN_HOME/config.toml`, else the nearest
    /// `.tessrun/config.toml` walking up from `start_dir`.
    ///
    /// The upward walk stops at a repository root (`.git`, `.hg`, `.svn`) or
    /// the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path, home: Option<&Path>) -> Option<PathBuf> {
        if let Some(home) = home {
            let candidate = home.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let mut current = Some(start_dir);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if [".git", ".hg", ".svn"].iter().any(|m| dir.join(m).exists()) {
                break;
            }
            current = dir.parent();
        }

        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidFile(format!("Failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            ConfigError::InvalidFile(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    fn apply_file(&mut self, file: TomlConfig) {
        let source = ConfigSource::Config;
        let attribution = &mut self.source_attribution;

        if let Some(engine) = file.engine {
            apply(&mut self.engine.executable, engine.executable, "executable", source, attribution);
            apply(&mut self.engine.thread_limit, engine.thread_limit, "thread_limit", source, attribution);
            apply(&mut self.engine.timeout_secs, engine.timeout_secs, "timeout_secs", source, attribution);
            apply(&mut self.engine.cache_version, engine.cache_version, "cache_version", source, attribution);
        }

        if let Some(defaults) = file.defaults {
            apply(&mut self.defaults.temp_dir, defaults.temp_dir, "temp_dir", source, attribution);
            apply(&mut self.defaults.lang, defaults.lang, "lang", source, attribution);
            apply(&mut self.defaults.psm, defaults.psm, "psm", source, attribution);
            apply(&mut self.defaults.oem, defaults.oem, "oem", source, attribution);
            apply(&mut self.defaults.tessdata_dir, defaults.tessdata_dir, "tessdata_dir", source, attribution);
            apply(&mut self.defaults.config_file, defaults.config_file, "config_file", source, attribution);
        }

        for (key, value) in file.variables.unwrap_or_default() {
            attribution.insert(format!("variables.{key}"), source);
            self.variables.insert(key, value);
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        let source = ConfigSource::Cli;
        let attribution = &mut self.source_attribution;

        apply(&mut self.engine.executable, cli.executable.clone(), "executable", source, attribution);
        apply(&mut self.engine.thread_limit, cli.thread_limit, "thread_limit", source, attribution);
        apply(&mut self.engine.timeout_secs, cli.timeout_secs, "timeout_secs", source, attribution);
        apply(&mut self.defaults.temp_dir, cli.temp_dir.clone(), "temp_dir", source, attribution);
        let lang = (!cli.lang.is_empty()).then(|| cli.lang.clone());
        apply(&mut self.defaults.lang, lang, "lang", source, attribution);
        apply(&mut self.defaults.psm, cli.psm, "psm", source, attribution);
        apply(&mut self.defaults.oem, cli.oem, "oem", source, attribution);
        apply(&mut self.defaults.tessdata_dir, cli.tessdata_dir.clone(), "tessdata_dir", source, attribution);
        apply(&mut self.defaults.config_file, cli.config_file.clone(), "config_file", source, attribution);

        for (key, value) in &cli.variables {
            attribution.insert(format!("variables.{key}"), source);
            self.variables.insert(key.clone(), value.clone());
        }
    }
}
