//! Error types for finplan-io

use finplan_core::{CoreError, ErrorCode};
use thiserror::Error;

fn describe(errors: &[CoreError]) -> String {
    match errors {
        [] => "no records checked".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("No JSON data supplied")]
    Empty,

    #[error("Malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Invalid document structure: {message}")]
    Structure { message: String },

    #[error("Import rejected: {}", describe(.errors))]
    Rejected { errors: Vec<CoreError> },
}

impl CodecError {
    pub fn structure(message: impl Into<String>) -> Self {
        CodecError::Structure {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CodecError::Rejected { errors } => errors
                .first()
                .map(CoreError::code)
                .unwrap_or(ErrorCode::ValidationError),
            _ => ErrorCode::ParseError,
        }
    }

    /// Every failing record, empty for document-level errors
    pub fn record_errors(&self) -> &[CoreError] {
        match self {
            CodecError::Rejected { errors } => errors,
            _ => &[],
        }
    }
}

impl From<CodecError> for CoreError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Rejected { mut errors } if !errors.is_empty() => errors.swap_remove(0),
            other => CoreError::parse(other.to_string()),
        }
    }
}
