//! Per-operation build context
//!
//! A [`GeneratorContext`] is the only place where the schema registry is
//! mutated: every schema holder it creates registers the fragments its
//! normalization discovered. Once all holders of an operation exist, the
//! registry is frozen into a snapshot and validators are compiled from it.

use crate::error::Result;
use crate::openapi::holder::SchemaHolder;
use crate::predicate::RequestPredicate;
use paramval_schemas::{FakeSchemaGenerator, JsonPointer, RegistrySnapshot, SchemaRegistry, SchemaResolver};
use serde_json::Value;
use tracing::debug;

/// Build-time state for one operation
#[derive(Debug)]
pub struct GeneratorContext<'r> {
    registry: &'r mut SchemaRegistry,
    predicates: Vec<RequestPredicate>,
}

impl<'r> GeneratorContext<'r> {
    pub fn new(registry: &'r mut SchemaRegistry) -> Self {
        Self {
            registry,
            predicates: Vec::new(),
        }
    }

    /// The schema a bare `$ref` points to, or the schema itself
    pub fn solve_if_needed(&self, schema: &Value) -> Result<Value> {
        Ok(SchemaResolver::new(&*self.registry).solve_if_needed(schema)?)
    }

    /// Attach a request-level predicate to the operation
    pub fn add_predicate(&mut self, predicate: RequestPredicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[RequestPredicate] {
        &self.predicates
    }

    pub fn into_predicates(self) -> Vec<RequestPredicate> {
        self.predicates
    }

    /// Fake counterpart of a schema, resolved against the document
    pub fn fake_schema(&self, schema: &Value) -> Value {
        FakeSchemaGenerator::new(self.registry.root()).generate(schema)
    }

    /// Normalize a schema, register what it references, and derive its fake form
    pub fn schema_holder(&mut self, original: &Value, location: JsonPointer) -> Result<SchemaHolder> {
        let fake = self.fake_schema(original);
        self.schema_holder_with_fake(original, fake, location)
    }

    /// Like [`GeneratorContext::schema_holder`] with a caller-provided fake schema
    pub fn schema_holder_with_fake(
        &mut self,
        original: &Value,
        fake: Value,
        location: JsonPointer,
    ) -> Result<SchemaHolder> {
        let normalized = SchemaResolver::new(&*self.registry).normalize(original, &location)?;

        let discovered = normalized.discovered.len();
        for (pointer, fragment) in normalized.discovered {
            self.registry.register(pointer, fragment);
        }
        self.registry
            .register(normalized.location.clone(), normalized.schema.clone());

        debug!(
            location = %location,
            normalized_location = %normalized.location,
            discovered,
            "created schema holder"
        );

        Ok(SchemaHolder::new(
            original.clone(),
            location,
            normalized.location,
            normalized.schema,
            fake,
        ))
    }

    /// Freeze the fragments registered so far
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::BuildContext;
    use crate::predicate::body_required;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new(json!({
            "components": {
                "schemas": {
                    "Node": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer", "minimum": 1},
                            "next": {"$ref": "#/components/schemas/Node"}
                        }
                    },
                    "Alias": {"$ref": "#/components/schemas/Node"}
                }
            }
        }))
    }

    #[test]
    fn test_holder_registers_fragments() {
        let mut registry = registry();
        let mut ctx = GeneratorContext::new(&mut registry);
        let location = JsonPointer::parse("/paths/~1nodes/get/parameters/0/schema").unwrap();
        let holder = ctx
            .schema_holder(&json!({"$ref": "#/components/schemas/Alias"}), location.clone())
            .unwrap();

        assert_eq!(holder.location(), &location);
        assert_eq!(
            holder.normalized_location(),
            &JsonPointer::parse("/components/schemas/Node").unwrap()
        );
        assert_eq!(holder.fake()["properties"]["id"], json!({"type": "integer"}));

        let build = BuildContext::default().with_snapshot(ctx.snapshot());
        let validator = holder.validator(&build).unwrap();
        assert!(validator.is_valid(&json!({"id": 1, "next": {"id": 2}})));
        assert!(!validator.is_valid(&json!({"id": 1, "next": {"id": 0}})));
    }

    #[test]
    fn test_predicates_and_solve() {
        let mut registry = registry();
        let mut ctx = GeneratorContext::new(&mut registry);
        ctx.add_predicate(body_required());

        let solved = ctx
            .solve_if_needed(&json!({"$ref": "#/components/schemas/Alias"}))
            .unwrap();
        assert_eq!(solved["type"], json!("object"));
        assert_eq!(ctx.into_predicates().len(), 1);
    }

    #[test]
    fn test_dangling_reference_fails() {
        let mut registry = registry();
        let mut ctx = GeneratorContext::new(&mut registry);
        let result = ctx.schema_holder(&json!({"$ref": "#/components/schemas/Missing"}), JsonPointer::root());
        assert!(result.is_err());
    }
}
