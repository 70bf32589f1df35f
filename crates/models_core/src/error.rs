//! Error types for model definition and validation.
//!
//! Definition-time problems (bad descriptors, unknown validator kinds,
//! unresolvable model references) surface as [`ModelError::Configuration`]
//! and friends. Failed validation of values surfaces as
//! [`ModelError::Validation`], which carries the full [`ValidationResult`].

use crate::diagnostics::ValidationResult;
use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Main error type for model operations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Invalid model or validator configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model type name not registered in the catalog
    #[error("Unknown model type '{0}'")]
    UnknownModel(String),

    /// Field name not declared on the model
    #[error("Model '{model}' has no field named '{field}'")]
    UnknownField {
        /// Model type name
        model: String,
        /// Requested field
        field: String,
    },

    /// Type descriptor text could not be parsed
    #[error("Invalid type descriptor '{input}': {reason}")]
    InvalidTypeDescriptor {
        /// Descriptor text
        input: String,
        /// What went wrong
        reason: String,
    },

    /// Regex pattern attached to a field does not compile
    #[error("Invalid regex pattern '{pattern}' for field '{field}': {reason}")]
    InvalidPattern {
        /// Field carrying the pattern
        field: String,
        /// Pattern text
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// One or more values failed validation; displays the rendered diagnostics
    #[error("{0}")]
    Validation(ValidationResult),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    /// Shorthand for a [`ModelError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        ModelError::Configuration(message.into())
    }

    /// Whether this error comes from definition or usage rather than from values.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ModelError::Configuration(_)
                | ModelError::UnknownModel(_)
                | ModelError::UnknownField { .. }
                | ModelError::InvalidTypeDescriptor { .. }
                | ModelError::InvalidPattern { .. }
        )
    }

    /// The validation result carried by a [`ModelError::Validation`].
    pub fn validation_result(&self) -> Option<&ValidationResult> {
        match self {
            ModelError::Validation(result) => Some(result),
            _ => None,
        }
    }
}

impl From<ValidationResult> for ModelError {
    fn from(result: ValidationResult) -> Self {
        ModelError::Validation(result)
    }
}
