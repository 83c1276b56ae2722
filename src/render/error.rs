//! Render error types
//!
//! Defines all error conditions that can occur while evaluating and rendering
//! a query expression.

use crate::engine::BoxError;
use thiserror::Error;

/// Errors that can occur during rendering
#[derive(Error, Debug)]
pub enum RenderError {
    /// The requested conversion is not defined for this kind of result
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A JSON envelope could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The evaluation context for the query could not be prepared
    #[error("Context preparation failed: {0}")]
    ContextPreparation(#[source] BoxError),

    /// The evaluator failed while computing the result
    #[error("Evaluation failed: {0}")]
    Evaluation(#[source] BoxError),
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Encoding(err.to_string())
    }
}

/// Result type alias for render operations
pub type RenderResult<T> = Result<T, RenderError>;
