//! Error types for tally-core
//!
//! Retrieval failures of every kind collapse into one "retrieval failed"
//! state on the record store; these types carry the code, severity and
//! suggestions reported alongside it.

use serde::{Deserialize, Serialize};
use tally_source::SourceError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Backend could not be reached
    Transport,
    /// Backend answered with a non-success status
    Backend,
    /// Response body was not a record listing
    InvalidFormat,
    /// Configuration error
    ConfigError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Transport => write!(f, "TRANSPORT"),
            ErrorCode::Backend => write!(f, "BACKEND"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub severity: ErrorSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            severity: ErrorSeverity::Error,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for tally-core
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("Backend unreachable: {message}")]
    Transport { message: String },

    #[error("Backend error: HTTP {status}")]
    Backend { status: u16, body: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Transport { .. } => ErrorCode::Transport,
            CoreError::Backend { .. } => ErrorCode::Backend,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Transport { .. } => ErrorSeverity::Warning,
            CoreError::Backend { .. } => ErrorSeverity::Error,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details =
            ErrorDetails::new(self.code(), self.to_string()).with_severity(self.severity());

        match self {
            CoreError::Transport { .. } => {
                details = details.with_suggestion(
                    "Check that the expense backend is running.".to_string(),
                );
                details = details.with_suggestion(
                    "Point BACKEND_URL or --backend-url at the backend.".to_string(),
                );
            }
            CoreError::Backend { status, body } => {
                details = details.with_detail(serde_json::json!({
                    "status": status,
                    "body": body,
                }));
                details = details
                    .with_suggestion("Check the backend logs for this request.".to_string());
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "decode_message": message }));
                details = details.with_suggestion(
                    "The endpoint must return an array of records or an object with a `results` array."
                        .to_string(),
                );
            }
            CoreError::ConfigError { .. } => {
                details = details.with_suggestion(
                    "See templates/default_config.yaml for reference.".to_string(),
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<SourceError> for CoreError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Transport { message } => CoreError::Transport { message },
            SourceError::IoError(e) => CoreError::Transport {
                message: e.to_string(),
            },
            SourceError::Backend { status, body } => CoreError::Backend { status, body },
            SourceError::MalformedPayload { message } => CoreError::InvalidFormat { message },
        }
    }
}

impl From<tally_config::ConfigError> for CoreError {
    fn from(error: tally_config::ConfigError) -> Self {
        CoreError::ConfigError {
            message: error.to_string(),
        }
    }
}

// ==================== Tests ====================
