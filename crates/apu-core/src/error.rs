//! Error types for loading and updating parameters.

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Input file could not be read
    E001InputRead,
    /// E002: Input file is not a valid parameter list
    E002InputParse,
    /// E003: A parameter record failed validation
    E003InvalidParameter,
    /// E004: Reading the existing parameter failed
    E004StoreRead,
    /// E005: Writing the parameter failed
    E005StoreWrite,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001InputRead => "E001",
            Self::E002InputParse => "E002",
            Self::E003InvalidParameter => "E003",
            Self::E004StoreRead => "E004",
            Self::E005StoreWrite => "E005",
        }
    }
}

/// Errors that can occur while loading or updating parameters
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParameterError {
    /// Input file could not be read
    #[error("[{code}] Unable to read parameter input file {path}: {message}")]
    InputRead {
        code: &'static str,
        path: String,
        message: String,
    },

    /// Input file could not be parsed
    #[error("[{code}] Invalid parameter input: {message}")]
    InputParse { code: &'static str, message: String },

    /// A record failed validation
    #[error("[{code}] Invalid parameter {name:?}: {message}")]
    InvalidParameter {
        code: &'static str,
        name: String,
        message: String,
    },

    /// The store could not return the current parameter
    #[error("[{code}] Could not retrieve parameter {name}: {message}")]
    StoreRead {
        code: &'static str,
        name: String,
        message: String,
    },

    /// The store rejected the write
    #[error("[{code}] Parameter {name} failed to update: {message}")]
    StoreWrite {
        code: &'static str,
        name: String,
        message: String,
    },
}

impl ParameterError {
    pub fn input_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputRead {
            code: ErrorCode::E001InputRead.as_str(),
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn input_parse(message: impl Into<String>) -> Self {
        Self::InputParse {
            code: ErrorCode::E002InputParse.as_str(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            code: ErrorCode::E003InvalidParameter.as_str(),
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn store_read(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreRead {
            code: ErrorCode::E004StoreRead.as_str(),
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn store_write(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            code: ErrorCode::E005StoreWrite.as_str(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// The code attached to this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputRead { code, .. }
            | Self::InputParse { code, .. }
            | Self::InvalidParameter { code, .. }
            | Self::StoreRead { code, .. }
            | Self::StoreWrite { code, .. } => code,
        }
    }
}

/// Result type alias for ParameterError
pub type Result<T> = std::result::Result<T, ParameterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_codes() {
        let err = ParameterError::store_write("/app/key", "AccessDenied");
        assert_eq!(err.code(), "E005");
        assert_eq!(
            err.to_string(),
            "[E005] Parameter /app/key failed to update: AccessDenied"
        );

        let err = ParameterError::invalid_parameter("", "name must not be empty");
        assert_eq!(err.code(), "E003");
        assert!(err.to_string().starts_with("[E003] Invalid parameter \"\""));
    }
}
