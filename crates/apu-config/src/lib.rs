// apu-config - Layered configuration for aws-parameter-update
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from APU_CONFIG env var
// 3. Config file contents from APU_CONFIG_CONTENT env var
// 4. Default config file locations (./apu.toml, ./.apu.toml)
// 5. Built-in defaults (lowest priority)
//
// Command-line flags are layered on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};

/// Default input file, used when neither a file nor a single parameter is given
pub const DEFAULT_INPUT_FILE: &str = "parameters.yaml";

/// Main runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// AWS client configuration
///
/// Unset fields fall through to the standard AWS provider chain
/// (`AWS_REGION`, `AWS_PROFILE`, shared config files, instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Custom endpoint, e.g. a local SSM emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// KMS key for SecureString parameters (key ID, ARN or alias)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

/// Update behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateConfig {
    #[serde(default = "default_input_file")]
    pub input_file: String,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_input_file() -> String {
    DEFAULT_INPUT_FILE.to_string()
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            dry_run: false,
            force: false,
            fail_fast: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority.
    /// A missing config file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from a specific file path (for the --config flag).
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Parse a TOML document on top of the defaults, without env overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config content")
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_configs() {
        let config = RuntimeConfig::default();
        assert_eq!(config.update.input_file, "parameters.yaml");
        assert!(!config.update.dry_run);
        assert_eq!(config.aws.region, None);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = RuntimeConfig::from_toml(
            r#"
            [aws]
            region = "us-west-2"
            kms_key_id = "alias/parameters"

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.aws.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.aws.kms_key_id.as_deref(), Some("alias/parameters"));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.update, UpdateConfig::default());
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(RuntimeConfig::from_toml("[aws]\nregoin = \"us-west-2\"\n").is_err());
    }
}
