use super::{LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "APU_";

/// Abstraction over environment-variable lookups so tests can supply
/// their own source of overrides.
pub trait EnvSource {
    /// Look up `key` with the APU_ prefix applied
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // AWS client
    if let Some(region) = get_env_string(env, "REGION") {
        config.aws.region = Some(region);
    }
    if let Some(profile) = get_env_string(env, "PROFILE") {
        config.aws.profile = Some(profile);
    }
    if let Some(endpoint) = get_env_string(env, "ENDPOINT_URL") {
        config.aws.endpoint_url = Some(endpoint);
    }
    if let Some(key_id) = get_env_string(env, "KMS_KEY_ID") {
        config.aws.kms_key_id = Some(key_id);
    }

    // Update behavior
    if let Some(path) = get_env_string(env, "INPUT_FILE") {
        config.update.input_file = path;
    }
    if let Some(val) = get_env_bool(env, "DRY_RUN")? {
        config.update.dry_run = val;
    }
    if let Some(val) = get_env_bool(env, "FORCE")? {
        config.update.force = val;
    }
    if let Some(val) = get_env_bool(env, "FAIL_FAST")? {
        config.update.fail_fast = val;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid APU_LOG_FORMAT value")?;
    }

    Ok(())
}

/// Empty values are treated as unset
fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|val| !val.trim().is_empty())
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): {}",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
