use serde::{Deserialize, Serialize};
use strum::{Display, VariantNames};

/// Where an effective configuration value came from.
///
/// Precedence, highest first: `Cli`, `Config`, `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, VariantNames)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument
    Cli,
    /// Value loaded from a configuration file
    Config,
    /// Built-in default value
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_labels() {
        assert_eq!(ConfigSource::Cli.to_string(), "cli");
        assert_eq!(ConfigSource::Config.to_string(), "config");
        assert_eq!(ConfigSource::Default.to_string(), "default");
        assert_eq!(ConfigSource::VARIANTS, ["cli", "config", "default"]);
    }

    #[test]
    fn test_config_source_serialization() {
        let json = serde_json::to_string(&ConfigSource::Config).unwrap();
        assert_eq!(json, r#""config""#);
        let parsed: ConfigSource = serde_json::from_str(r#""cli""#).unwrap();
        assert_eq!(parsed, ConfigSource::Cli);
    }
}
