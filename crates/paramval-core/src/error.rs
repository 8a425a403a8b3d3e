//! Error types for the Paramval core library
//!
//! This module defines the build-time error handling system for Paramval,
//! using thiserror for ergonomic error definitions and anyhow for flexible
//! error contexts. Request-time outcomes are not errors of this type: they
//! are returned as [`crate::processor::ValidationResult`] values.

use paramval_schemas::{LoaderError, ValidatorBuildError};
use thiserror::Error;

/// Main error type for Paramval build-time operations
#[derive(Error, Debug)]
pub enum Error {
    /// Document loading or `$ref` resolution failed
    #[error("Schema resolution failed: {0}")]
    Loader(#[from] LoaderError),

    /// A normalized schema could not be compiled
    #[error("Validator compilation failed: {0}")]
    ValidatorBuild(#[from] ValidatorBuildError),

    /// A schema does not fit the parameter style it is used with
    #[error("Invalid schema for parameter '{parameter}': {message}")]
    InvalidSchema { parameter: String, message: String },

    /// The serialization style is not supported for this location
    #[error("Unsupported style '{style}' for {location} parameter '{parameter}'")]
    UnsupportedStyle {
        parameter: String,
        location: String,
        style: String,
    },

    /// A malformed OpenAPI parameter or operation object
    #[error("Invalid OpenAPI definition at '{pointer}': {message}")]
    InvalidDefinition { pointer: String, message: String },

    /// No operation carries the requested `operationId`
    #[error("Operation '{operation_id}' not found")]
    OperationNotFound { operation_id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid schema error
    pub fn invalid_schema(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid definition error
    pub fn invalid_definition(pointer: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            pointer: pointer.to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

// Conversion implementations
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
