//! Parameter file loading
//!
//! The input file is a YAML sequence of records:
//!
//! ```yaml
//! - name: /app/database/url
//!   value: postgres://db.internal:5432/app
//!   description: Primary database URL
//!   is_secure: false
//! ```

use crate::error::{ParameterError, Result};
use crate::parameter::Parameter;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Read, parse and validate the parameter file at `path`.
pub fn load_parameters(path: impl AsRef<Path>) -> Result<Vec<Parameter>> {
    let path = path.as_ref();
    info!("Using input file: {}", path.display());

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ParameterError::input_read(path.display().to_string(), e.to_string()))?;

    let parameters = parse_parameters(&contents)?;
    info!(count = parameters.len(), "Parameters YAML loaded");
    Ok(parameters)
}

/// Parse and validate a YAML parameter list.
pub fn parse_parameters(contents: &str) -> Result<Vec<Parameter>> {
    if contents.trim().is_empty() {
        return Err(ParameterError::input_parse("file contains no parameters"));
    }

    let parameters: Vec<Parameter> = serde_yaml::from_str(contents)
        .map_err(|e| ParameterError::input_parse(e.to_string()))?;

    if parameters.is_empty() {
        warn!("Parameter list is empty; nothing to update");
    }

    let mut seen = HashSet::with_capacity(parameters.len());
    for (index, parameter) in parameters.iter().enumerate() {
        parameter.validate().map_err(|e| match e {
            ParameterError::InvalidParameter { name, message, .. } => {
                ParameterError::invalid_parameter(name, format!("record {}: {}", index + 1, message))
            }
            other => other,
        })?;

        if !seen.insert(parameter.name.as_str()) {
            return Err(ParameterError::invalid_parameter(
                &parameter.name,
                format!("record {}: duplicate parameter name", index + 1),
            ));
        }
    }

    Ok(parameters)
}
