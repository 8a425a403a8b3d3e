//! Paramval Schemas - schema resolution and compiled validation
//!
//! This crate is the schema side of the parameter validation engine:
//!
//! - **Loading**: YAML and JSON OpenAPI / JSON Schema documents
//! - **Resolution**: `$ref` normalization into self-contained fragments,
//!   registered once in an arena keyed by JSON pointer
//! - **Fake schemas**: constraint-free shapes used to infer style parsers
//! - **Validation**: draft-07 validators compiled once and shared across
//!   threads
//!
//! ## Quick Start
//!
//! ```rust
//! use paramval_schemas::{
//!     CompiledValidator, JsonPointer, SchemaRegistry, SchemaResolver, SchemaValidator,
//! };
//! use serde_json::json;
//!
//! let document = json!({
//!     "components": {
//!         "schemas": {
//!             "Color": {
//!                 "type": "object",
//!                 "properties": {"r": {"$ref": "#/components/schemas/Channel"}},
//!                 "additionalProperties": false
//!             },
//!             "Channel": {"type": "integer", "minimum": 0, "maximum": 255}
//!         }
//!     }
//! });
//!
//! let mut registry = SchemaRegistry::new(document);
//! let location = JsonPointer::parse("/components/schemas/Color").unwrap();
//! let schema = registry.lookup(&location).cloned().unwrap();
//! let normalized = SchemaResolver::new(&registry).normalize(&schema, &location).unwrap();
//! for (pointer, fragment) in normalized.discovered {
//!     registry.register(pointer, fragment);
//! }
//!
//! let validator = CompiledValidator::compile(&normalized.schema, &registry.snapshot()).unwrap();
//! assert!(validator.is_valid(&json!({"r": 255})));
//! assert!(validator.validate(&json!({"r": 256})).is_err());
//! ```
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

pub mod fake;
pub mod loader;
pub mod validation;

// Re-export commonly used types for convenience
pub use fake::{is_object_shaped, FakeSchemaGenerator};
pub use loader::{
    Format, Fragment, FragmentId, JsonPointer, LoaderError, LoaderResult, Normalized,
    RegistrySnapshot, SchemaParser, SchemaRegistry, SchemaResolver, SCHEMA_NAMESPACE,
};
pub use validation::{
    compile_validator, CompiledValidator, SchemaValidator, SchemaViolation, ValidationResult,
    ValidatorBuildError, Violation,
};
