//! Error types for compiled schema validation
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single schema violation with detailed context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The schema keyword that failed (`minimum`, `additionalProperties`, ...)
    pub keyword: String,
    /// Pointer to the failing part of the validated value
    pub instance_path: String,
    /// Pointer to the failing keyword inside the schema
    pub schema_path: String,
    /// Human-readable description
    pub message: String,
}

impl Violation {
    /// Create a violation, deriving the keyword from the schema path
    pub fn new<I, S, M>(instance_path: I, schema_path: S, message: M) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        M: Into<String>,
    {
        let schema_path = schema_path.into();
        let keyword = schema_path
            .rsplit('/')
            .find(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
            .unwrap_or("schema")
            .to_string();
        Self {
            keyword,
            instance_path: instance_path.into(),
            schema_path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() { "/" } else { &self.instance_path };
        write!(f, "'{}' violated at '{}': {}", self.keyword, at, self.message)
    }
}

/// A value failed its schema
///
/// `violations` is never empty; it may be truncated to the configured cap.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// Retained violations, in evaluation order
    pub violations: Vec<Violation>,
    /// Whether more violations were found than retained
    pub truncated: bool,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value does not match schema")?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        if self.truncated {
            write!(f, "\n  - ...")?;
        }
        Ok(())
    }
}

impl SchemaViolation {
    /// Create a violation report
    pub fn new(violations: Vec<Violation>, truncated: bool) -> Self {
        Self {
            violations,
            truncated,
        }
    }

    /// The first violation, usually the most specific one
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// Number of retained violations
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the report holds no violation
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A schema could not be compiled into a validator
#[derive(Debug, Error)]
pub enum ValidatorBuildError {
    /// The schema itself is not a valid draft-07 schema
    #[error("Failed to compile schema: {reason}")]
    Compile { reason: String },

    /// A reference in the schema points to no registered fragment
    #[error("Schema references unknown fragment '{uri}'")]
    UnknownFragment { uri: String },
}
