use tessrun_utils::ConfigError;

use super::Config;

fn invalid(key: &str, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    }
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(psm) = self.defaults.psm
            && psm > 13
        {
            return Err(invalid("psm", format!("{psm} is not between 0 and 13")));
        }

        if let Some(oem) = self.defaults.oem
            && oem > 3
        {
            return Err(invalid("oem", format!("{oem} is not between 0 and 3")));
        }

        if self.engine.thread_limit == Some(0) {
            return Err(invalid("thread_limit", "must be greater than 0"));
        }

        if self.engine.timeout_secs == Some(0) {
            return Err(invalid("timeout_secs", "must be greater than 0"));
        }

        if let Some(executable) = &self.engine.executable
            && executable.trim().is_empty()
        {
            return Err(invalid("executable", "must not be empty"));
        }

        if let Some(config_file) = &self.defaults.config_file
            && config_file.trim().is_empty()
        {
            return Err(invalid("config_file", "must not be empty"));
        }

        if let Some(lang) = &self.defaults.lang
            && lang.iter().any(|l| l.trim().is_empty())
        {
            return Err(invalid("lang", "language codes must not be empty"));
        }

        if let Some(key) = self.variables.keys().find(|k| k.trim().is_empty()) {
            return Err(invalid("variables", format!("invalid variable name '{key}'")));
        }

        Ok(())
    }
}
