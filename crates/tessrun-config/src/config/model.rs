use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigSource;

/// Effective configuration after merging defaults, file and CLI.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub defaults: Defaults,
    /// Engine variables passed as `-c key=value`
    pub variables: BTreeMap<String, String>,
    /// Which layer supplied each key
    pub source_attribution: HashMap<String, ConfigSource>,
    /// File the configuration was loaded from, if any
    pub config_path: Option<PathBuf>,
}

/// `[engine]` section: how the engine process is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub executable: Option<String>,
    pub thread_limit: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub cache_version: Option<bool>,
}

/// `[defaults]` section: recognition settings applied to every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub temp_dir: Option<PathBuf>,
    pub lang: Option<Vec<String>>,
    pub psm: Option<u8>,
    pub oem: Option<u8>,
    pub tessdata_dir: Option<PathBuf>,
    pub config_file: Option<String>,
}

/// On-disk file layout.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub engine: Option<EngineConfig>,
    pub defaults: Option<Defaults>,
    pub variables: Option<BTreeMap<String, String>>,
}

impl Config {
    /// Engine executable, `tesseract` unless configured.
    #[must_use]
    pub fn executable(&self) -> &str {
        self.engine.executable.as_deref().unwrap_or("tesseract")
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.engine.timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn cache_version(&self) -> bool {
        self.engine.cache_version.unwrap_or(false)
    }

    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }
}
