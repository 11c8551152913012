// Initialization utilities
//
// Parameter store and logging/tracing setup

use apu_config::{LogConfig, LogFormat, RuntimeConfig};
use apu_ssm::SsmParameterStore;
use tracing::info;

/// Build the SSM-backed store from RuntimeConfig
pub(crate) async fn init_store(config: &RuntimeConfig) -> SsmParameterStore {
    match (&config.aws.region, &config.aws.profile) {
        (Some(region), Some(profile)) => {
            info!("Initializing SSM client: region={}, profile={}", region, profile)
        }
        (Some(region), None) => info!("Initializing SSM client: region={}", region),
        (None, Some(profile)) => info!("Initializing SSM client: profile={}", profile),
        (None, None) => info!("Initializing SSM client from the default AWS chain"),
    }

    if let Some(key_id) = &config.aws.kms_key_id {
        info!("Secure parameters will be encrypted with KMS key {}", key_id);
    }

    SsmParameterStore::from_config(&config.aws).await
}

/// Initialize tracing/logging from LogConfig
///
/// Logs go to stderr so stdout only carries the update summary.
pub fn init_tracing(config: &LogConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Try to set the global subscriber; ignore error if already set (idempotent)
    let _ = match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr)),
        ),
    };
}
