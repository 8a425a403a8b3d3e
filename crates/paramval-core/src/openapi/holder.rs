//! Resolved schemas of one parameter or body

use crate::dsl::BuildContext;
use crate::error::Result;
use paramval_schemas::{JsonPointer, SchemaValidator};
use serde_json::Value;
use std::sync::Arc;

/// A schema with its normalized and fake forms
///
/// Everything is computed when the holder is created; the holder is
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaHolder {
    original: Value,
    location: JsonPointer,
    normalized_location: JsonPointer,
    normalized: Value,
    fake: Value,
}

impl SchemaHolder {
    pub(crate) fn new(
        original: Value,
        location: JsonPointer,
        normalized_location: JsonPointer,
        normalized: Value,
        fake: Value,
    ) -> Self {
        Self {
            original,
            location,
            normalized_location,
            normalized,
            fake,
        }
    }

    /// The schema as written in the document
    pub fn original(&self) -> &Value {
        &self.original
    }

    /// Where the original schema lives
    pub fn location(&self) -> &JsonPointer {
        &self.location
    }

    /// Where the normalized schema was resolved from
    ///
    /// Differs from [`SchemaHolder::location`] when the original schema is a
    /// bare `$ref`.
    pub fn normalized_location(&self) -> &JsonPointer {
        &self.normalized_location
    }

    /// Self-contained schema with namespaced references
    pub fn normalized(&self) -> &Value {
        &self.normalized
    }

    pub fn fake(&self) -> &Value {
        &self.fake
    }

    /// Compile the normalized schema
    ///
    /// The context's snapshot must contain every fragment registered while
    /// the holder was created.
    pub fn validator(&self, ctx: &BuildContext) -> Result<Arc<dyn SchemaValidator>> {
        ctx.compile(&self.normalized)
    }
}
