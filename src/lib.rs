// aws-parameter-update - create or update AWS Systems Manager parameters
//
// Input is either a YAML file of records or a single record from the
// command line. Records are loaded and validated up front, then applied
// one at a time against Parameter Store.

use anyhow::{Context, Result};
use apu_config::RuntimeConfig;
use apu_core::{
    load_parameters, Parameter, ParameterStore, UpdateOptions, UpdateReport, Updater,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

mod init;

pub use init::init_tracing;

/// Where the records for a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateSource {
    File(PathBuf),
    Single(Parameter),
}

impl UpdateSource {
    /// Load and validate the records for this source.
    pub fn load(&self) -> Result<Vec<Parameter>> {
        match self {
            UpdateSource::File(path) => Ok(load_parameters(path)?),
            UpdateSource::Single(parameter) => {
                parameter.validate()?;
                Ok(vec![parameter.clone()])
            }
        }
    }
}

/// Translate the update section of the config into updater options
pub fn update_options(config: &RuntimeConfig) -> UpdateOptions {
    UpdateOptions {
        dry_run: config.update.dry_run,
        force: config.update.force,
        key_id: config.aws.kms_key_id.clone(),
        fail_fast: config.update.fail_fast,
    }
}

/// Apply records to an already constructed store
pub async fn run_with_store<S: ParameterStore>(
    store: S,
    parameters: &[Parameter],
    options: UpdateOptions,
) -> UpdateReport {
    if options.dry_run {
        info!("Dry run: no parameters will be written");
    }

    Updater::new(store, options).update_all(parameters).await
}

/// Entry point with pre-loaded configuration (for CLI usage)
pub async fn run_with_config(
    config: &RuntimeConfig,
    source: &UpdateSource,
) -> Result<UpdateReport> {
    // Input problems surface before any AWS call is made
    let parameters = source.load().context("Failed to load parameters")?;

    let store = init::init_store(config).await;
    Ok(run_with_store(store, &parameters, update_options(config)).await)
}

/// Update every parameter listed in a YAML file
pub async fn update_from_file(
    path: impl Into<PathBuf>,
    config: &RuntimeConfig,
) -> Result<UpdateReport> {
    run_with_config(config, &UpdateSource::File(path.into())).await
}

/// Update a single parameter
pub async fn update_parameter(
    parameter: Parameter,
    config: &RuntimeConfig,
) -> Result<UpdateReport> {
    run_with_config(config, &UpdateSource::Single(parameter)).await
}

/// Write the per-record summary
pub fn write_report<W: Write>(out: &mut W, report: &UpdateReport) -> std::io::Result<()> {
    for record in &report.results {
        match &record.result {
            Ok(outcome) => {
                write!(out, "{:<12} {}", outcome.label(), record.name)?;
                match outcome.version() {
                    Some(version) => writeln!(out, " (version {version})")?,
                    None => writeln!(out)?,
                }
            }
            Err(e) => writeln!(out, "{:<12} {}: {}", "failed", record.name, e)?,
        }
    }

    write!(
        out,
        "{} written, {} unchanged, {} failed",
        report.written(),
        report.unchanged(),
        report.failed()
    )?;
    if report.skipped > 0 {
        write!(out, ", {} skipped", report.skipped)?;
    }
    writeln!(out)
}
