//! Error types for Guardiane.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application, including configuration, input validation, knowledge-base
//! data, embedding and LLM providers, and prompts.

use thiserror::Error;

/// Shown when the question is blank.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// Shown when an embedding or generation provider fails.
pub const PROVIDER_FAILURE_MESSAGE: &str =
    "Sorry, I'm having trouble reaching my knowledge base right now. Please try again later.";

/// Shown for every other failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Oops! Something went wrong. Please try again later.";

/// Unified error type for Guardiane.
///
/// All fallible functions return `Result<T, AppError>`. Errors are only turned
/// into user-facing text at the outermost answer boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Blank or otherwise unusable question
    #[error("Invalid input: {0}")]
    Input(String),

    /// Malformed knowledge-base records
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generative model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the failure came from an external model provider.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, AppError::Llm(_) | AppError::Embedding(_))
    }

    /// Plain-text message that is safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Input(_) => EMPTY_QUESTION_MESSAGE,
            AppError::Llm(_) | AppError::Embedding(_) => PROVIDER_FAILURE_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_mapping() {
        assert_eq!(
            AppError::Input("blank".to_string()).user_message(),
            EMPTY_QUESTION_MESSAGE
        );
        assert_eq!(
            AppError::Llm("timeout".to_string()).user_message(),
            PROVIDER_FAILURE_MESSAGE
        );
        assert_eq!(
            AppError::Embedding("refused".to_string()).user_message(),
            PROVIDER_FAILURE_MESSAGE
        );
        assert_eq!(
            AppError::DataFormat("missing answer".to_string()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }

    #[test]
    fn test_provider_error_classification() {
        assert!(AppError::Llm("x".to_string()).is_provider_error());
        assert!(!AppError::Knowledge("x".to_string()).is_provider_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Serialization(_)));
    }
}
