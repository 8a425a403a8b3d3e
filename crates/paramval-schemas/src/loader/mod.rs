//! Document loading and schema resolution
//!
//! This module provides:
//! - YAML and JSON document parsing
//! - JSON pointers and their namespace URI form
//! - The fragment registry shared by every compiled validator
//! - `$ref` normalization with cycle-safe fragment discovery
//!
//! # Example Usage
//!
//! ```rust
//! use paramval_schemas::loader::{JsonPointer, SchemaRegistry, SchemaResolver};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new(json!({
//!     "components": {"schemas": {"Id": {"type": "integer"}}}
//! }));
//! let normalized = SchemaResolver::new(&registry).normalize(
//!     &json!({"type": "array", "items": {"$ref": "#/components/schemas/Id"}}),
//!     &JsonPointer::parse("/paths/~1pets/get/parameters/0/schema")?,
//! )?;
//! for (pointer, schema) in normalized.discovered {
//!     registry.register(pointer, schema);
//! }
//! assert_eq!(registry.len(), 1);
//! # Ok::<(), paramval_schemas::LoaderError>(())
//! ```
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;
pub mod pointer;
pub mod registry;
pub mod resolver;

pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, SchemaParser};
pub use pointer::{JsonPointer, SCHEMA_NAMESPACE};
pub use registry::{Fragment, FragmentId, RegistrySnapshot, SchemaRegistry};
pub use resolver::{Normalized, SchemaResolver};
