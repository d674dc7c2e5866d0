use std::collections::BTreeMap;

use super::Config;

impl Config {
    /// Effective configuration as `key -> (value, source)`, sorted by key.
    ///
    /// Unset keys are omitted; the executable always appears.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                let source = self.source_of(key).to_string();
                config.insert(key.to_string(), (value, source));
            }
        };

        add("executable", Some(self.executable().to_string()));
        add("thread_limit", self.engine.thread_limit.map(|v| v.to_string()));
        add("timeout_secs", self.engine.timeout_secs.map(|v| v.to_string()));
        add("cache_version", Some(self.cache_version().to_string()));
        add("temp_dir", self.defaults.temp_dir.as_ref().map(|p| p.display().to_string()));
        add("lang", self.defaults.lang.as_ref().map(|l| l.join("+")));
        add("psm", self.defaults.psm.map(|v| v.to_string()));
        add("oem", self.defaults.oem.map(|v| v.to_string()));
        add(
            "tessdata_dir",
            self.defaults.tessdata_dir.as_ref().map(|p| p.display().to_string()),
        );
        add("config_file", self.defaults.config_file.clone());

        for (key, value) in &self.variables {
            add(&format!("variables.{key}"), Some(value.clone()));
        }

        config
    }
}
