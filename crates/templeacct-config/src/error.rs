//! Error types for templeacct-config

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigErrorCode {
    FileNotFound,
    InvalidYaml,
    MissingField,
    InvalidValue,
    UnsupportedBackend,
    Unreadable,
}

impl std::fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ConfigErrorCode::InvalidYaml => write!(f, "INVALID_YAML"),
            ConfigErrorCode::MissingField => write!(f, "MISSING_FIELD"),
            ConfigErrorCode::InvalidValue => write!(f, "INVALID_VALUE"),
            ConfigErrorCode::UnsupportedBackend => write!(f, "UNSUPPORTED_BACKEND"),
            ConfigErrorCode::Unreadable => write!(f, "UNREADABLE"),
        }
    }
}

/// Error report printed when the server refuses to start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigErrorDetails {
    pub code: ConfigErrorCode,
    pub message: String,
    /// Field path (for field-specific errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ConfigErrorDetails {
    pub fn new(code: ConfigErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ConfigErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  - {}", suggestion)?;
        }
        Ok(())
    }
}

/// Reasons the server refuses to start with a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Cannot read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Invalid YAML format: {message}")]
    InvalidYaml { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Backend URL {url} is not plain http://")]
    UnsupportedBackend { url: String },
}

impl ConfigError {
    pub fn code(&self) -> ConfigErrorCode {
        match self {
            ConfigError::FileNotFound { .. } => ConfigErrorCode::FileNotFound,
            ConfigError::Unreadable { .. } => ConfigErrorCode::Unreadable,
            ConfigError::InvalidYaml { .. } => ConfigErrorCode::InvalidYaml,
            ConfigError::MissingField { .. } => ConfigErrorCode::MissingField,
            ConfigError::InvalidValue { .. } => ConfigErrorCode::InvalidValue,
            ConfigError::UnsupportedBackend { .. } => ConfigErrorCode::UnsupportedBackend,
        }
    }

    /// Code, message and fix-it hints for the startup report
    pub fn to_details(&self) -> ConfigErrorDetails {
        let details = ConfigErrorDetails::new(self.code(), self.to_string());

        match self {
            ConfigError::FileNotFound { .. } => details
                .with_suggestion("Use --config to point at an existing file.".to_string())
                .with_suggestion("Run with --print-default-config to create one.".to_string()),
            ConfigError::InvalidYaml { message } => {
                details.with_suggestion(format!("Fix the YAML syntax: {}", message))
            }
            ConfigError::MissingField { field } => details
                .with_field(field)
                .with_suggestion(format!("Add the '{}' field to your config file.", field)),
            ConfigError::InvalidValue { field, reason } => {
                details.with_field(field).with_suggestion(reason.clone())
            }
            ConfigError::UnsupportedBackend { .. } => details
                .with_field("backend.base_url")
                .with_suggestion("Point the report server at the backend's internal http:// address.".to_string()),
            ConfigError::Unreadable { .. } => {
                details.with_suggestion("Check the file's permissions and encoding (UTF-8).".to_string())
            }
        }
    }
}
