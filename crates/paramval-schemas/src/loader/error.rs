//! Error types for document loading and schema resolution
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while loading documents and resolving schema references
///
/// Every variant is a build-time failure: a route whose schemas cannot be
/// loaded or resolved must never start accepting traffic.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML document '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON document '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// A `$ref` could not be dereferenced within the known document set
    #[error("Failed to resolve reference '{reference}' at '{location}': {reason}")]
    SchemaResolution {
        reference: String,
        location: String,
        reason: String,
    },

    /// A `$ref` pointing outside the local document
    #[error("Unsupported reference '{reference}' at '{location}': only local '#/...' references are resolved")]
    UnsupportedReference { reference: String, location: String },

    /// A chain of bare references that never reaches a schema body
    #[error("Reference cycle without content: {chain}")]
    ReferenceCycle { chain: String },

    /// Malformed JSON pointer
    #[error("Invalid JSON pointer '{pointer}': {reason}")]
    InvalidPointer { pointer: String, reason: String },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Create a dangling reference error
    pub fn schema_resolution(
        reference: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaResolution {
            reference: reference.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported (non-local) reference error
    pub fn unsupported_reference(reference: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnsupportedReference {
            reference: reference.into(),
            location: location.into(),
        }
    }

    /// Create a reference cycle error from the visited pointer chain
    pub fn reference_cycle<S: AsRef<str>>(chain: &[S]) -> Self {
        let chain = chain
            .iter()
            .map(|p| format!("#{}", p.as_ref()))
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::ReferenceCycle { chain }
    }

    /// Create an invalid pointer error
    pub fn invalid_pointer(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPointer {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::IoError { path, .. } => Some(path),
            Self::YamlParseError { path, .. } => Some(path),
            Self::JsonParseError { path, .. } => Some(path),
            Self::UnsupportedFormat { path } => Some(path),
            _ => None,
        }
    }

    /// Whether this error comes from reference resolution rather than I/O or syntax
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaResolution { .. }
                | Self::UnsupportedReference { .. }
                | Self::ReferenceCycle { .. }
        )
    }
}
