//! Integration tests for `$ref` normalization and fragment registration
//!
//! These tests cover mutual and self references, idempotent re-normalization,
//! and the end-to-end path from a document to a compiled validator.

use paramval_schemas::{
    CompiledValidator, JsonPointer, LoaderError, SchemaRegistry, SchemaResolver, SchemaValidator,
};
use serde_json::{json, Value};

fn document() -> Value {
    json!({
        "components": {
            "schemas": {
                "Person": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "pet": {"$ref": "#/components/schemas/Pet"}
                    }
                },
                "Pet": {
                    "type": "object",
                    "properties": {
                        "owner": {"$ref": "#/components/schemas/Person"},
                        "age": {"type": "integer", "minimum": 0}
                    }
                },
                "Channel": {"type": "integer", "minimum": 0, "maximum": 255},
                "Settings": {
                    "type": "object",
                    "properties": {
                        "default": {"$ref": "#/components/schemas/Channel"},
                        "examples": {"type": "array", "items": {"$ref": "#/components/schemas/Channel"}}
                    }
                },
                "Tree": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "integer"},
                        "children": {"type": "array", "items": {"$ref": "#/components/schemas/Tree"}}
                    },
                    "additionalProperties": false
                }
            }
        }
    })
}

fn pointer(p: &str) -> JsonPointer {
    JsonPointer::parse(p).unwrap()
}

fn normalize_and_register(registry: &mut SchemaRegistry, location: &JsonPointer) -> Value {
    let schema = registry.lookup(location).cloned().unwrap();
    let normalized = SchemaResolver::new(registry).normalize(&schema, location).unwrap();
    for (p, fragment) in normalized.discovered {
        registry.register(p, fragment);
    }
    normalized.schema
}

#[cfg(test)]
mod cycles {
    use super::*;

    #[test]
    fn test_mutual_references_terminate() {
        let registry = SchemaRegistry::new(document());
        let location = pointer("/components/schemas/Person");
        let schema = registry.lookup(&location).cloned().unwrap();

        let normalized = SchemaResolver::new(&registry).normalize(&schema, &location).unwrap();

        let keys: Vec<String> = normalized.discovered.keys().map(|p| p.to_string()).collect();
        assert_eq!(keys, vec!["/components/schemas/Person", "/components/schemas/Pet"]);
        assert_eq!(
            normalized.discovered[&pointer("/components/schemas/Pet")]["properties"]["owner"]["$ref"],
            json!(location.to_uri())
        );
    }

    #[test]
    fn test_recursive_schema_validates() {
        let mut registry = SchemaRegistry::new(document());
        let schema = normalize_and_register(&mut registry, &pointer("/components/schemas/Tree"));
        let validator = CompiledValidator::compile(&schema, &registry.snapshot()).unwrap();

        assert!(validator.is_valid(&json!({
            "value": 1,
            "children": [{"value": 2, "children": [{"value": 3}]}]
        })));

        let report = validator
            .validate(&json!({"value": 1, "children": [{"value": "two"}]}))
            .unwrap_err();
        assert_eq!(report.first().unwrap().instance_path, "/children/0/value");
    }
}

#[cfg(test)]
mod idempotence {
    use super::*;

    #[test]
    fn test_renormalizing_yields_same_pair() {
        let mut registry = SchemaRegistry::new(document());
        let location = pointer("/components/schemas/Pet");
        let schema = registry.lookup(&location).cloned().unwrap();

        let first = SchemaResolver::new(&registry).normalize(&schema, &location).unwrap();
        for (p, fragment) in first.discovered.clone() {
            registry.register(p, fragment);
        }
        let second = SchemaResolver::new(&registry)
            .normalize(&first.schema, &first.location)
            .unwrap();

        assert_eq!(second.location, first.location);
        assert_eq!(second.schema, first.schema);
        assert!(second.discovered.is_empty());
    }

    #[test]
    fn test_registration_is_not_repeated() {
        let mut registry = SchemaRegistry::new(document());
        normalize_and_register(&mut registry, &pointer("/components/schemas/Person"));
        let after_first = registry.len();
        normalize_and_register(&mut registry, &pointer("/components/schemas/Pet"));
        assert_eq!(registry.len(), after_first);
    }
}

#[cfg(test)]
mod failures {
    use super::*;

    #[test]
    fn test_dangling_pointer_is_build_time_error() {
        let registry = SchemaRegistry::new(document());
        let err = SchemaResolver::new(&registry)
            .normalize(
                &json!({"properties": {"x": {"$ref": "#/components/schemas/Nope"}}}),
                &pointer("/paths/~1x/get/parameters/0/schema"),
            )
            .unwrap_err();

        assert!(err.is_resolution_error());
        assert!(matches!(err, LoaderError::SchemaResolution { .. }));
        assert!(err.to_string().contains("#/components/schemas/Nope"));
    }
}

#[cfg(test)]
mod keyword_named_properties {
    use super::*;

    #[test]
    fn test_property_named_default_is_resolved() {
        let mut registry = SchemaRegistry::new(document());
        let schema = normalize_and_register(&mut registry, &pointer("/components/schemas/Settings"));
        let channel = pointer("/components/schemas/Channel");

        assert_eq!(schema["properties"]["default"]["$ref"], json!(channel.to_uri()));
        assert_eq!(schema["properties"]["examples"]["items"]["$ref"], json!(channel.to_uri()));
        assert!(registry.contains(&channel));

        let validator = CompiledValidator::compile(&schema, &registry.snapshot()).unwrap();
        assert!(validator.is_valid(&json!({"default": 12, "examples": [1, 2]})));

        let report = validator.validate(&json!({"default": 300})).unwrap_err();
        assert_eq!(report.first().unwrap().instance_path, "/default");
    }
}
