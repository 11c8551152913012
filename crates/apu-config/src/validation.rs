// Configuration validation
//
// Validates that set values are usable before any AWS client is built

use super::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_aws_config(&config.aws)?;
    validate_update_config(&config.update)?;
    validate_log_config(&config.log)?;
    Ok(())
}

fn validate_aws_config(config: &AwsConfig) -> Result<()> {
    if let Some(region) = &config.region {
        if region.trim().is_empty() {
            bail!(
                "AWS region must not be empty\n\n\
                How to fix:\n\
                  • Environment: export {}REGION=us-west-2\n\
                  • TOML: [aws]\n          region = \"us-west-2\"\n\
                  • Or remove the setting to use the AWS default chain",
                ENV_PREFIX
            );
        }
    }

    if matches!(&config.profile, Some(profile) if profile.trim().is_empty()) {
        bail!("aws.profile must not be empty when set");
    }

    if let Some(endpoint) = &config.endpoint_url {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            bail!(
                "aws.endpoint_url must start with http:// or https:// (got '{}')",
                endpoint
            );
        }

        if endpoint.starts_with("http://") {
            warn!(
                endpoint = %endpoint,
                "aws.endpoint_url uses plain HTTP; parameter values will be sent unencrypted"
            );
        }
    }

    if matches!(&config.kms_key_id, Some(key) if key.trim().is_empty()) {
        bail!("aws.kms_key_id must not be empty when set");
    }

    Ok(())
}

fn validate_update_config(config: &UpdateConfig) -> Result<()> {
    if config.input_file.trim().is_empty() {
        bail!(
            "update.input_file must not be empty\n\n\
            How to fix:\n\
              • Environment: export {}INPUT_FILE=parameters.yaml\n\
              • TOML: [update]\n          input_file = \"parameters.yaml\"",
            ENV_PREFIX
        );
    }

    if config.dry_run && config.force {
        warn!("update.force has no effect on writes during a dry run");
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_aws_config() {
        let valid = AwsConfig {
            region: Some("us-west-2".to_string()),
            profile: None,
            endpoint_url: Some("https://ssm.us-west-2.amazonaws.com".to_string()),
            kms_key_id: Some("alias/parameters".to_string()),
        };
        assert!(validate_aws_config(&valid).is_ok());

        let empty_region = AwsConfig {
            region: Some(String::new()),
            ..valid.clone()
        };
        assert!(validate_aws_config(&empty_region).is_err());

        let bad_endpoint = AwsConfig {
            endpoint_url: Some("localhost:4566".to_string()),
            ..valid.clone()
        };
        assert!(validate_aws_config(&bad_endpoint).is_err());

        let empty_key = AwsConfig {
            kms_key_id: Some(" ".to_string()),
            ..valid
        };
        assert!(validate_aws_config(&empty_key).is_err());
    }

    #[test]
    fn test_validate_update_config() {
        assert!(validate_update_config(&UpdateConfig::default()).is_ok());

        let empty_input = UpdateConfig {
            input_file: String::new(),
            ..Default::default()
        };
        assert!(validate_update_config(&empty_input).is_err());
    }

    #[test]
    fn test_validate_log_config() {
        let empty_level = LogConfig {
            level: String::new(),
            format: LogFormat::Json,
        };
        assert!(validate_log_config(&empty_level).is_err());
    }
}
