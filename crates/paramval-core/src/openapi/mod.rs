//! OpenAPI generator layer
//!
//! Turns the operations of an OpenAPI 3 document into [`RequestValidator`]s:
//!
//! - [`OpenApiDocument`] reads operations and parameter objects
//! - [`GeneratorContext`] normalizes schemas and registers their fragments
//! - [`SchemaHolder`] keeps the original, normalized and fake schema together
//! - [`OperationBuilder`] maps styles and assembles the processors
//!
//! [`RequestValidator`]: crate::operation::RequestValidator

pub mod builder;
pub mod context;
pub mod document;
pub mod holder;

pub use builder::{OperationBuilder, ResolvedStyle};
pub use context::GeneratorContext;
pub use document::{OpenApiDocument, OperationRef, ParameterDefinition};
pub use holder::SchemaHolder;
