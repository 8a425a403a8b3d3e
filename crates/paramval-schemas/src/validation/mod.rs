//! Schema validation for parsed parameter values
//!
//! Normalized schemas are compiled once into a [`CompiledValidator`] and then
//! evaluated many times. A failing value produces a [`SchemaViolation`] that
//! lists each failing keyword together with the instance and schema paths.
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod compiled;
pub mod error;

// Re-export commonly used types
pub use base::{SchemaValidator, ValidationResult};
pub use compiled::CompiledValidator;
pub use error::{SchemaViolation, ValidatorBuildError, Violation};

use crate::loader::registry::RegistrySnapshot;
use serde_json::Value;

/// Convenience function to compile a validator with a violation cap
///
/// # Examples
///
/// ```rust
/// use paramval_schemas::validation::{compile_validator, SchemaValidator};
/// use paramval_schemas::RegistrySnapshot;
/// use serde_json::json;
///
/// let validator = compile_validator(
///     &json!({"type": "integer", "minimum": 0}),
///     &RegistrySnapshot::default(),
///     10,
/// )
/// .unwrap();
///
/// assert!(validator.validate(&json!(42)).is_ok());
/// assert!(validator.validate(&json!(-1)).is_err());
/// ```
pub fn compile_validator(
    schema: &Value,
    snapshot: &RegistrySnapshot,
    max_violations: usize,
) -> Result<CompiledValidator, ValidatorBuildError> {
    Ok(CompiledValidator::compile(schema, snapshot)?.with_max_violations(max_violations))
}
