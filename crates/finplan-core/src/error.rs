//! Error types for finplan-core
//!
//! Every fallible core operation reports one of four kinds of failure:
//! validation, parsing, out-of-range input, or a missing record. None of
//! them is fatal; the caller decides how to display and recover.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// An entity violates one of its invariants
    ValidationError,
    /// Input text could not be interpreted
    ParseError,
    /// A month, category or index is outside its domain
    InputRange,
    /// A record referenced by handle does not exist
    NotFound,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::InputRange => write!(f, "INPUT_RANGE"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational, the operation was a no-op
    Info,
    /// Warning - the request was rejected, state is unchanged
    Warning,
    /// Error - the input could not be processed at all
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field or location the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            suggestions: vec![],
        }
    }

    /// Add the offending field
    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
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

/// Main error type for finplan-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Value out of range: {field} - {reason}")]
    InputRange { field: String, reason: String },

    #[error("{kind} not found: {reference}")]
    NotFound { kind: String, reference: String },
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        CoreError::Parse {
            message: message.into(),
        }
    }

    pub fn input_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InputRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, reference: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            kind: kind.into(),
            reference: reference.to_string(),
        }
    }

    /// Prefix the field path, e.g. `amount` becomes `expenses[3].amount`
    pub fn within(self, prefix: &str) -> Self {
        match self {
            CoreError::Validation { field, message } => CoreError::Validation {
                field: format!("{}.{}", prefix, field),
                message,
            },
            CoreError::InputRange { field, reason } => CoreError::InputRange {
                field: format!("{}.{}", prefix, field),
                reason,
            },
            CoreError::Parse { message } => CoreError::Parse {
                message: format!("{}: {}", prefix, message),
            },
            other => other,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Parse { .. } => ErrorCode::ParseError,
            CoreError::InputRange { .. } => ErrorCode::InputRange,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::Parse { .. } => ErrorSeverity::Error,
            CoreError::InputRange { .. } => ErrorSeverity::Warning,
            CoreError::NotFound { .. } => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Validation { field, .. } => details
                .with_field(field.clone())
                .with_suggestion(
                    "Amounts must be greater than 0 and text fields must not be blank.".to_string(),
                ),
            CoreError::Parse { .. } => details
                .with_suggestion(
                    "Check that the input is well-formed JSON with an object root.".to_string(),
                )
                .with_suggestion("Dates must be written as YYYY-MM-DD.".to_string()),
            CoreError::InputRange { field, .. } => details
                .with_field(field.clone())
                .with_suggestion("Months run from 1 to 12 and categories from 0 to 4.".to_string()),
            CoreError::NotFound { .. } => details
                .with_suggestion(
                    "List the records again; the entry may already have been deleted.".to_string(),
                ),
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
