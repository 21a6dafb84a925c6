//! Error types for templeacct-core
//!
//! Every failure a report action can hit maps to one `CoreError` variant,
//! which in turn carries a code, a severity, suggestions and the notice the
//! page shows to the user.

use serde::{Deserialize, Serialize};
use templeacct_config::ConfigError;
use thiserror::Error;

use crate::types::Notice;
use crate::validate::ValidationError;

/// Stable code attached to every logged failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Date selection rejected before any backend call
    ValidationError,
    /// Backend unreachable, non-2xx, or `success == false`
    RequestFailure,
    /// Backend answered with data of the wrong shape
    MalformedResponse,
    /// Unknown report or missing form field
    InvalidRequest,
    /// Settings the server cannot run with
    ConfigError,
    /// A failure on this side that the user cannot fix
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RequestFailure => "REQUEST_FAILURE",
            ErrorCode::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(code)
    }
}

/// JSON body of a failed `/api` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Details with no extra data or hints
    pub fn plain(code: ErrorCode, message: String) -> Self {
        Self::new(code, message, None, &[])
    }

    fn new(code: ErrorCode, message: String, details: Option<serde_json::Value>, suggestions: &[&str]) -> Self {
        Self {
            code,
            message,
            details,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " {}", details)?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  hint: {}", suggestion)?;
        }
        Ok(())
    }
}

/// How loudly a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// The action was blocked but nothing failed
    Warning,
    /// The action failed
    Error,
}

/// Why a report action produced no report
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request failed: {message}")]
    RequestFailure { message: String },

    #[error("Unexpected response from the accounting service: {message}")]
    MalformedResponse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::RequestFailure { .. } => ErrorCode::RequestFailure,
            CoreError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            CoreError::Config(_) => ErrorCode::ConfigError,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Validation(_) => ErrorSeverity::Warning,
            CoreError::RequestFailure { .. }
            | CoreError::MalformedResponse { .. }
            | CoreError::Config(_)
            | CoreError::Internal { .. } => ErrorSeverity::Error,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        let message = self.to_string();
        match self {
            CoreError::Validation(err) => ErrorDetails::new(
                self.code(),
                message,
                Some(serde_json::json!({ "reason": err.reason() })),
                &["Pick dates inside the active accounting year."],
            ),
            CoreError::RequestFailure { .. } => ErrorDetails::new(
                self.code(),
                message,
                None,
                &[
                    "Check that the accounting service is running and reachable.",
                    "Try generating the report again.",
                ],
            ),
            CoreError::MalformedResponse { message: response } => ErrorDetails::new(
                self.code(),
                message.clone(),
                Some(serde_json::json!({ "response_message": response })),
                &["The accounting service may be a different version than expected."],
            ),
            CoreError::Config(err) => {
                let config = err.to_details();
                ErrorDetails {
                    code: self.code(),
                    message,
                    details: Some(serde_json::json!({ "config_code": config.code, "field": config.field })),
                    suggestions: config.suggestions,
                }
            }
            CoreError::Internal { .. } => ErrorDetails::new(self.code(), message, None, &["Check the server log."]),
        }
    }

    /// Transient notification shown to the user
    pub fn to_notice(&self) -> Notice {
        match self.severity() {
            ErrorSeverity::Warning => Notice::warning(self.to_string()),
            ErrorSeverity::Error => Notice::error(self.to_string()),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

const LOGGED_PARAMS: [&str; 3] = ["date", "from_date", "to_date"];

/// Where a failure happened, for the log line
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// e.g. `trial-balance/view`
    pub operation: String,
    /// Page view the request belongs to
    pub view_id: Option<String>,
    /// Submitted dates, as typed
    pub dates: Vec<(String, String)>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Self::default()
        }
    }

    pub fn with_view_id(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    /// Keep the date fields out of the submitted form
    pub fn with_dates(mut self, params: &[(String, String)]) -> Self {
        self.dates = params
            .iter()
            .filter(|(k, _)| LOGGED_PARAMS.contains(&k.as_str()))
            .cloned()
            .collect();
        self
    }

    fn describe(&self) -> String {
        let mut out = self.operation.clone();
        if let Some(view_id) = &self.view_id {
            out.push_str(&format!(" view={}", view_id));
        }
        for (k, v) in &self.dates {
            out.push_str(&format!(" {}={:?}", k, v));
        }
        out
    }
}

pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Writes through the `log` facade under the `templeacct::error` target
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Warning => {
                log::warn!(target: "templeacct::error", "[{}] {} ({})", error.code(), error, context.describe())
            }
            ErrorSeverity::Error => {
                log::error!(target: "templeacct::error", "{} ({})", error.to_details(), context.describe())
            }
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(target: "templeacct::error", "{} ({})", message, context.describe());
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(target: "templeacct::error", "{} ({})", message, context.describe());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoticeLevel;
    use crate::validate::DateField;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::RequestFailure.to_string(), "REQUEST_FAILURE");
        assert_eq!(ErrorCode::MalformedResponse.to_string(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn test_validation_is_a_warning_notice() {
        let error: CoreError = ValidationError::MissingDate { field: DateField::From }.into();
        assert_eq!(error.code(), ErrorCode::ValidationError);
        assert_eq!(error.severity(), ErrorSeverity::Warning);

        let notice = error.to_notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Please select a valid from date");
    }

    #[test]
    fn test_request_failure_is_an_error_notice() {
        let error = CoreError::RequestFailure { message: "No active accounting year".to_string() };
        assert_eq!(error.to_notice().level, NoticeLevel::Error);
        assert!(error.to_notice().message.contains("No active accounting year"));
    }

    #[test]
    fn test_details_carry_reason_and_suggestions() {
        let error: CoreError = ValidationError::MissingDate { field: DateField::AsOn }.into();
        let details = error.to_details();
        assert_eq!(details.details, Some(serde_json::json!({ "reason": "MISSING_DATE" })));
        assert!(!details.suggestions.is_empty());
        assert!(details.to_string().starts_with("[VALIDATION_ERROR]"));
    }

    #[test]
    fn test_config_error_keeps_field_and_hints() {
        let error: CoreError = ConfigError::InvalidValue {
            field: "reports.indent_px".to_string(),
            reason: "Indent must be between 1 and 64 pixels".to_string(),
        }
        .into();
        assert_eq!(error.code(), ErrorCode::ConfigError);
        assert_eq!(error.severity(), ErrorSeverity::Error);

        let details = error.to_details();
        assert_eq!(
            details.details,
            Some(serde_json::json!({ "config_code": "INVALID_VALUE", "field": "reports.indent_px" }))
        );
        assert_eq!(details.suggestions, vec!["Indent must be between 1 and 64 pixels".to_string()]);
        assert!(details.to_string().starts_with("[CONFIG_ERROR] Configuration error: Invalid value for reports.indent_px"));
    }

    #[test]
    fn test_internal_error_is_an_error_notice() {
        let error = CoreError::Internal { message: "bad export header".to_string() };
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert_eq!(error.to_notice().level, NoticeLevel::Error);
        assert_eq!(error.to_string(), "Internal error: bad export header");
    }

    #[test]
    fn test_error_context_keeps_only_dates() {
        let params = vec![
            ("view_id".to_string(), "v-1".to_string()),
            ("date".to_string(), "2024-11-20".to_string()),
            ("fund_id".to_string(), "3".to_string()),
        ];
        let context = ErrorContext::new("balance-sheet/view").with_view_id("v-1").with_dates(&params);
        assert_eq!(context.dates, vec![("date".to_string(), "2024-11-20".to_string())]);
        assert_eq!(context.describe(), "balance-sheet/view view=v-1 date=\"2024-11-20\"");
    }
}
