//! Error types for Mindwell

use thiserror::Error;

/// Errors that can occur while preparing or encoding an assessment
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Non-finite value for field: {0}")]
    NonFiniteInput(&'static str),

    #[error("Failed to parse provider payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
