//! Per-record update dispatch
//!
//! Records are processed one at a time, in input order. Each record is
//! compared against what the store already holds and only written when the
//! value or type differs (or when forced). Values are never logged.

use crate::error::{ParameterError, Result};
use crate::parameter::Parameter;
use crate::store::ParameterStore;
use tracing::{debug, error, info};

/// Knobs for a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Compare only; never write
    pub dry_run: bool,
    /// Write without reading the existing value first
    pub force: bool,
    /// KMS key used for SecureString parameters
    pub key_id: Option<String>,
    /// Stop at the first failed record
    pub fail_fast: bool,
}

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Created { version: i64 },
    Updated { version: i64 },
    Unchanged { version: i64 },
    WouldCreate,
    WouldUpdate,
}

impl UpdateOutcome {
    /// True when the store was (or would have been) written
    pub fn is_write(&self) -> bool {
        !matches!(self, UpdateOutcome::Unchanged { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpdateOutcome::Created { .. } => "created",
            UpdateOutcome::Updated { .. } => "updated",
            UpdateOutcome::Unchanged { .. } => "unchanged",
            UpdateOutcome::WouldCreate => "would create",
            UpdateOutcome::WouldUpdate => "would update",
        }
    }

    /// Version now held by the store; unknown for dry runs
    pub fn version(&self) -> Option<i64> {
        match self {
            UpdateOutcome::Created { version }
            | UpdateOutcome::Updated { version }
            | UpdateOutcome::Unchanged { version } => Some(*version),
            UpdateOutcome::WouldCreate | UpdateOutcome::WouldUpdate => None,
        }
    }
}

impl std::fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())?;
        if let Some(version) = self.version() {
            write!(f, " (version {version})")?;
        }
        Ok(())
    }
}

/// Outcome of one record, keyed by parameter name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResult {
    pub name: String,
    pub result: Result<UpdateOutcome>,
}

/// Ordered results for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub results: Vec<RecordResult>,
    /// Records never attempted because the run stopped early
    pub skipped: usize,
}

impl UpdateReport {
    pub fn written(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.result, Ok(outcome) if outcome.is_write()))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.result, Ok(UpdateOutcome::Unchanged { .. })))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_err()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ParameterError)> {
        self.results.iter().filter_map(|r| match &r.result {
            Err(e) => Some((r.name.as_str(), e)),
            Ok(_) => None,
        })
    }
}

/// Applies parameter records to a [`ParameterStore`]
pub struct Updater<S> {
    store: S,
    options: UpdateOptions,
}

impl<S: ParameterStore> Updater<S> {
    pub fn new(store: S, options: UpdateOptions) -> Self {
        Self { store, options }
    }

    /// Create or update a single parameter.
    pub async fn update(&self, parameter: &Parameter) -> Result<UpdateOutcome> {
        let existing_version = if self.options.force {
            None
        } else {
            match self.needs_updating(parameter).await? {
                NeedsUpdate::No { version } => {
                    info!(name = %parameter.name, "Parameter does not need updating");
                    return Ok(UpdateOutcome::Unchanged { version });
                }
                NeedsUpdate::Yes { version } => version,
            }
        };

        if self.options.dry_run {
            return Ok(match (existing_version, self.options.force) {
                (Some(_), _) => UpdateOutcome::WouldUpdate,
                (None, false) => UpdateOutcome::WouldCreate,
                // Nothing was read, so the existing state is unknown
                (None, true) => UpdateOutcome::WouldUpdate,
            });
        }

        let request = parameter.to_put_request(self.options.key_id.as_deref());
        let version = self.store.put_parameter(&request).await?;

        info!(
            name = %parameter.name,
            parameter_type = %request.parameter_type,
            version,
            "Parameter successfully updated"
        );

        if version == 1 {
            Ok(UpdateOutcome::Created { version })
        } else {
            Ok(UpdateOutcome::Updated { version })
        }
    }

    /// Apply every record in order, collecting per-record results.
    pub async fn update_all(&self, parameters: &[Parameter]) -> UpdateReport {
        let mut report = UpdateReport::default();

        for (index, parameter) in parameters.iter().enumerate() {
            let result = self.update(parameter).await;

            match &result {
                Ok(outcome) => info!(name = %parameter.name, %outcome, "Parameter processed"),
                Err(e) => error!(name = %parameter.name, error = %e, "Parameter not updated"),
            }

            let failed = result.is_err();
            report.results.push(RecordResult {
                name: parameter.name.clone(),
                result,
            });

            if failed && self.options.fail_fast {
                report.skipped = parameters.len() - index - 1;
                if report.skipped > 0 {
                    info!(
                        skipped = report.skipped,
                        "Stopping after first failure (fail-fast)"
                    );
                }
                break;
            }
        }

        info!(
            written = report.written(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "Parameter update finished running"
        );

        report
    }

    async fn needs_updating(&self, parameter: &Parameter) -> Result<NeedsUpdate> {
        match self.store.get_parameter(&parameter.name).await? {
            Some(existing) => {
                debug!(
                    name = %parameter.name,
                    version = existing.version,
                    parameter_type = %existing.parameter_type,
                    "Found existing parameter"
                );

                if existing.value != parameter.value {
                    info!(name = %parameter.name, "Parameter value changed");
                    Ok(NeedsUpdate::Yes {
                        version: Some(existing.version),
                    })
                } else if existing.parameter_type != parameter.parameter_type() {
                    info!(
                        name = %parameter.name,
                        from = %existing.parameter_type,
                        to = %parameter.parameter_type(),
                        "Parameter type changed"
                    );
                    Ok(NeedsUpdate::Yes {
                        version: Some(existing.version),
                    })
                } else {
                    Ok(NeedsUpdate::No {
                        version: existing.version,
                    })
                }
            }
            None => {
                info!(name = %parameter.name, "Parameter does not exist yet");
                Ok(NeedsUpdate::Yes { version: None })
            }
        }
    }
}

enum NeedsUpdate {
    Yes { version: Option<i64> },
    No { version: i64 },
}
