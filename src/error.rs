//! Error types for the I-V model and its collaborators.

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors reported to the caller.
///
/// None of these are fatal to a long-lived host: a failed computation leaves
/// no state behind, so a subsequent call with corrected input succeeds
/// independently.
#[derive(Error, Debug)]
pub enum ModelError {
    /// An input violates a model invariant
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A raw text field does not parse as a real number
    #[error("field '{field}' is not a number: '{value}'")]
    MalformedInput { field: String, value: String },

    /// A field was supplied by neither the command line nor the parameter file
    #[error("missing parameter '{0}' (not on the command line or in the parameter file)")]
    MissingParameter(String),
}
