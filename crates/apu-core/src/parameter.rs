use crate::error::{ParameterError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

const MAX_NAME_LEN: usize = 2048;
const MAX_DESCRIPTION_LEN: usize = 1024;
const MAX_HIERARCHY_DEPTH: usize = 15;
/// Standard tier value limit; larger values need the advanced tier
const STANDARD_TIER_VALUE_BYTES: usize = 4096;
const RESERVED_PREFIXES: [&str; 2] = ["aws", "ssm"];

/// A single parameter record
///
/// # Example
/// ```
/// use apu_core::Parameter;
/// let parameter = Parameter {
///     name: "example_name".into(),
///     value: "example_value".into(),
///     description: "example_description".into(),
///     is_secure: false,
/// };
/// assert!(parameter.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    /// Parameter Store name
    pub name: String,
    /// Value to store, plaintext or secret
    #[serde(deserialize_with = "non_null_string")]
    pub value: String,
    /// Extra text used to clarify the use of a parameter
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Toggles whether the parameter is stored encrypted
    #[serde(default)]
    pub is_secure: bool,
}

// YAML `~`/`null` would otherwise come through as the literal text
fn non_null_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("value must not be null"))
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Parameter {
    /// Creates a new parameter
    ///
    /// ```
    /// use apu_core::Parameter;
    /// let parameter = Parameter::new("test_name", "test_value", "test_description", true);
    /// assert!(parameter.is_secure);
    /// ```
    pub fn new<S>(name: S, value: S, description: S, is_secure: bool) -> Parameter
    where
        S: Into<String>,
    {
        Parameter {
            name: name.into(),
            value: value.into(),
            description: description.into(),
            is_secure,
        }
    }

    pub fn parameter_type(&self) -> ParameterType {
        if self.is_secure {
            ParameterType::SecureString
        } else {
            ParameterType::String
        }
    }

    /// Check the record against Parameter Store naming and size rules.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        if self.value.is_empty() {
            return Err(ParameterError::invalid_parameter(
                &self.name,
                "value must not be empty",
            ));
        }

        if self.value.len() > STANDARD_TIER_VALUE_BYTES {
            warn!(
                name = %self.name,
                bytes = self.value.len(),
                "value exceeds the standard tier limit of 4096 bytes; the store may reject it"
            );
        }

        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ParameterError::invalid_parameter(
                &self.name,
                format!("description must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }

        Ok(())
    }

    /// Build the write for this record.
    pub fn to_put_request(&self, key_id: Option<&str>) -> PutRequest {
        let parameter_type = self.parameter_type();
        PutRequest {
            name: self.name.clone(),
            value: self.value.clone(),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            parameter_type,
            // always overwrite or this utility is useless
            overwrite: true,
            key_id: match parameter_type {
                ParameterType::SecureString => key_id.map(str::to_string),
                _ => None,
            },
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ParameterError::invalid_parameter(
            name,
            "name must not be empty",
        ));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ParameterError::invalid_parameter(
            name,
            format!("name must be at most {MAX_NAME_LEN} characters"),
        ));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')))
    {
        return Err(ParameterError::invalid_parameter(
            name,
            format!("name contains invalid character {bad:?}; allowed: a-zA-Z0-9_.-/"),
        ));
    }

    let unrooted = name.trim_start_matches('/').to_ascii_lowercase();
    if let Some(prefix) = RESERVED_PREFIXES.iter().find(|p| unrooted.starts_with(*p)) {
        return Err(ParameterError::invalid_parameter(
            name,
            format!("name must not begin with reserved prefix {prefix:?}"),
        ));
    }

    if name.contains('/') {
        if !name.starts_with('/') {
            return Err(ParameterError::invalid_parameter(
                name,
                "hierarchical names must begin with '/'",
            ));
        }

        if name.split('/').skip(1).any(str::is_empty) {
            return Err(ParameterError::invalid_parameter(
                name,
                "name must not contain empty path segments",
            ));
        }

        let depth = name.split('/').skip(1).count();
        if depth > MAX_HIERARCHY_DEPTH {
            return Err(ParameterError::invalid_parameter(
                name,
                format!("name hierarchy must be at most {MAX_HIERARCHY_DEPTH} levels deep"),
            ));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    StringList,
    SecureString,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::StringList => "StringList",
            ParameterType::SecureString => "SecureString",
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter as it currently exists in the store, value decrypted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    pub version: i64,
}

/// A single create-or-update call against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub parameter_type: ParameterType,
    pub overwrite: bool,
    /// KMS key for SecureString parameters; the account default key when absent
    pub key_id: Option<String>,
}
