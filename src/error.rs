//! Error types for query generation

use thiserror::Error;

/// Errors that can occur while synthesizing SQL
#[derive(Debug, Error)]
pub enum QueryGeneratorError {
    /// A JSON function call was found next to unbalanced parentheses or a
    /// statement terminator. Carries the rejected input.
    #[error("Invalid json statement: {0}")]
    MalformedJsonStatement(String),

    /// A rendered column definition mentions `REFERENCES` but is not of the
    /// form `<body> REFERENCES <clause>`.
    #[error("Invalid reference attribute '{attribute}': {definition}")]
    InvalidReferenceAttribute {
        attribute: String,
        definition: String,
    },

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueryGeneratorError {
    pub fn malformed_json_statement(statement: impl Into<String>) -> Self {
        Self::MalformedJsonStatement(statement.into())
    }

    pub fn invalid_reference_attribute(
        attribute: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self::InvalidReferenceAttribute {
            attribute: attribute.into(),
            definition: definition.into(),
        }
    }

    pub fn invalid_condition(msg: impl Into<String>) -> Self {
        Self::InvalidCondition(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QueryGeneratorError>;
