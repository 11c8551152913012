use anyhow::{bail, Context, Result};
use apu_config::{LogFormat, RuntimeConfig};
use apu_core::Parameter;
use aws_parameter_update::{init_tracing, run_with_config, write_report, UpdateSource};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

/// Allows you to update AWS Parameters using a YAML file or directly from the CLI
#[derive(Parser)]
#[command(name = "apu")]
#[command(version)]
#[command(
    about = "Allows you to update AWS Parameters using a YAML file or directly from the CLI",
    long_about = None
)]
struct Cli {
    /// Sets the input file to use
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = ["name", "value", "description", "secure"]
    )]
    filename: Option<PathBuf>,

    /// New parameter name
    #[arg(short, long, value_name = "NAME", requires = "value")]
    name: Option<String>,

    /// New parameter value
    #[arg(short, long, value_name = "VALUE", requires = "name")]
    value: Option<String>,

    /// New parameter description
    #[arg(short, long, value_name = "DESCRIPTION", requires = "name")]
    description: Option<String>,

    /// Stores the parameter securely
    #[arg(short, long, requires = "name")]
    secure: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// AWS region (overrides config file and AWS defaults)
    #[arg(long, value_name = "REGION")]
    region: Option<String>,

    /// AWS shared config profile
    #[arg(long, value_name = "PROFILE")]
    profile: Option<String>,

    /// Custom SSM endpoint, e.g. http://localhost:4566
    #[arg(long, value_name = "URL")]
    endpoint_url: Option<String>,

    /// KMS key used to encrypt secure parameters
    #[arg(long, value_name = "KEY")]
    kms_key_id: Option<String>,

    /// Show what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Write parameters even when the stored value is unchanged
    #[arg(long)]
    force: bool,

    /// Stop at the first parameter that fails to update
    #[arg(long)]
    fail_fast: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'l', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build tokio runtime and run the async update
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Step 1: Load base configuration
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_cli_overrides(&mut config, &cli)?;

    // Tracing first so validation warnings are visible
    init_tracing(&config.log);
    config.validate()?;
    info!("Starting aws-parameter-update...");

    // Step 3: Decide where the records come from
    let source = resolve_source(&cli, &config)?;

    // Step 4: Apply records
    let report = run_with_config(&config, &source).await?;

    let mut stdout = std::io::stdout().lock();
    write_report(&mut stdout, &report).context("Failed to write update summary")?;

    info!("Ending AWS parameter updates");

    if report.has_failures() {
        bail!(
            "{} of {} parameters failed to update",
            report.failed(),
            report.results.len()
        );
    }

    Ok(())
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) -> Result<()> {
    if let Some(region) = &cli.region {
        config.aws.region = Some(region.clone());
    }
    if let Some(profile) = &cli.profile {
        config.aws.profile = Some(profile.clone());
    }
    if let Some(endpoint) = &cli.endpoint_url {
        config.aws.endpoint_url = Some(endpoint.clone());
    }
    if let Some(key_id) = &cli.kms_key_id {
        config.aws.kms_key_id = Some(key_id.clone());
    }

    // Flags can only switch these on; config and env can also switch them on
    config.update.dry_run |= cli.dry_run;
    config.update.force |= cli.force;
    config.update.fail_fast |= cli.fail_fast;

    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid --log-format value")?;
    }

    Ok(())
}

fn resolve_source(cli: &Cli, config: &RuntimeConfig) -> Result<UpdateSource> {
    if let Some(filename) = &cli.filename {
        return Ok(UpdateSource::File(filename.clone()));
    }

    if let Some(name) = &cli.name {
        let Some(value) = &cli.value else {
            bail!("--name requires --value");
        };
        return Ok(UpdateSource::Single(Parameter::new(
            name.clone(),
            value.clone(),
            cli.description.clone().unwrap_or_default(),
            cli.secure,
        )));
    }

    let default_input = Path::new(&config.update.input_file);
    if !default_input.exists() {
        bail!(
            "No input was provided and {} does not exist. Use -h or --help to see valid input options",
            default_input.display()
        );
    }

    info!(
        "No input flags given; using configured input file {}",
        default_input.display()
    );
    Ok(UpdateSource::File(default_input.to_path_buf()))
}
