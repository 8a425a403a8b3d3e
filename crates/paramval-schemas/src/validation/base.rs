//! Base validation trait
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::SchemaViolation;
use serde_json::Value;
use std::sync::Arc;

/// Result type for validating one value
pub type ValidationResult<T> = Result<T, SchemaViolation>;

/// A stateless, schema-bound validation function
///
/// Implementations are immutable after construction and may be shared
/// across threads and invoked concurrently.
pub trait SchemaValidator: Send + Sync {
    /// Validate a value, reporting every violation found
    fn validate(&self, value: &Value) -> ValidationResult<()>;

    /// Check a value without building a violation report
    fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}

impl<T: SchemaValidator + ?Sized> SchemaValidator for Arc<T> {
    fn validate(&self, value: &Value) -> ValidationResult<()> {
        (**self).validate(value)
    }

    fn is_valid(&self, value: &Value) -> bool {
        (**self).is_valid(value)
    }
}

impl<T: SchemaValidator + ?Sized> SchemaValidator for Box<T> {
    fn validate(&self, value: &Value) -> ValidationResult<()> {
        (**self).validate(value)
    }

    fn is_valid(&self, value: &Value) -> bool {
        (**self).is_valid(value)
    }
}
