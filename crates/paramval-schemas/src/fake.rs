//! Fake schema generation
//!
//! A fake schema keeps the structural shape of a schema (types, property
//! names, item arity) and drops every value constraint. Style parsers are
//! inferred from it, so the parser tree never depends on `$ref` plumbing or
//! on composition keywords.
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::loader::pointer::JsonPointer;
use serde_json::{Map, Value};

/// Keywords removed from every level of a fake schema
pub const STRIPPED_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "enum",
    "const",
    "minItems",
    "maxItems",
    "uniqueItems",
    "contains",
    "required",
    "minProperties",
    "maxProperties",
    "propertyNames",
    "dependencies",
    "if",
    "then",
    "else",
    "not",
];

const COMBINATORS: &[(&str, &str)] = &[("allOf", "x-allOf"), ("anyOf", "x-anyOf"), ("oneOf", "x-oneOf")];

/// Derives constraint-free schemas, resolving references in a document
#[derive(Debug, Clone, Copy)]
pub struct FakeSchemaGenerator<'d> {
    document: &'d Value,
}

impl<'d> FakeSchemaGenerator<'d> {
    /// Create a generator resolving references against `document`
    pub fn new(document: &'d Value) -> Self {
        Self { document }
    }

    /// Generate the fake counterpart of `schema`
    pub fn generate(&self, schema: &Value) -> Value {
        self.fake(schema, &mut Vec::new())
    }

    fn fake(&self, schema: &Value, visiting: &mut Vec<JsonPointer>) -> Value {
        let (schema, entered) = match self.solve(schema, visiting) {
            Some(solved) => solved,
            // Recursive reference: the inner shape is unconstrained.
            None => return Value::Object(Map::new()),
        };

        let result = match schema {
            Value::Object(obj) => self.fake_object(obj, visiting),
            other => other.clone(),
        };

        visiting.truncate(visiting.len() - entered);
        result
    }

    /// Follow a `$ref` chain, pushing every target on the visiting stack
    ///
    /// Returns the solved schema and the number of pushed pointers, or
    /// `None` when the chain re-enters a schema being generated.
    fn solve<'a>(&'a self, schema: &'a Value, visiting: &mut Vec<JsonPointer>) -> Option<(&'a Value, usize)> {
        let mut current = schema;
        let mut entered = 0;
        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            let pointer = match Self::pointer_of(reference) {
                Some(pointer) => pointer,
                None => break,
            };
            if visiting.contains(&pointer) {
                visiting.truncate(visiting.len() - entered);
                return None;
            }
            match pointer.query(self.document) {
                Some(target) => {
                    visiting.push(pointer);
                    entered += 1;
                    current = target;
                }
                None => break,
            }
        }
        Some((current, entered))
    }

    fn pointer_of(reference: &str) -> Option<JsonPointer> {
        if reference.starts_with('#') {
            JsonPointer::from_reference(reference).ok()
        } else {
            JsonPointer::from_uri(reference)
        }
    }

    fn fake_object(&self, obj: &Map<String, Value>, visiting: &mut Vec<JsonPointer>) -> Value {
        let mut out = Map::new();

        for (key, value) in obj {
            if STRIPPED_KEYWORDS.contains(&key.as_str())
                || COMBINATORS.iter().any(|(name, _)| name == key)
            {
                continue;
            }
            let faked = match key.as_str() {
                "properties" | "patternProperties" => self.fake_map(value, visiting),
                "additionalProperties" | "additionalItems" => self.fake(value, visiting),
                "items" => match value {
                    Value::Array(items) => {
                        Value::Array(items.iter().map(|item| self.fake(item, visiting)).collect())
                    }
                    other => self.fake(other, visiting),
                },
                _ => value.clone(),
            };
            out.insert(key.clone(), faked);
        }

        for (combinator, preserved) in COMBINATORS {
            if let Some(Value::Array(members)) = obj.get(*combinator) {
                let faked: Vec<Value> = members.iter().map(|m| self.fake(m, visiting)).collect();
                Self::merge_members(&mut out, &faked);
                out.insert((*preserved).to_string(), Value::Array(members.clone()));
            }
        }

        Value::Object(out)
    }

    fn fake_map(&self, value: &Value, visiting: &mut Vec<JsonPointer>) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(name, schema)| (name.clone(), self.fake(schema, visiting)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Merge object-shaped members into the enclosing schema
    ///
    /// Existing keys win. Non-object members only contribute a `type` when
    /// every member agrees on it.
    fn merge_members(out: &mut Map<String, Value>, members: &[Value]) {
        for member in members.iter().filter(|m| is_object_shaped(m)) {
            out.entry("type").or_insert_with(|| Value::String("object".into()));
            for keyword in ["properties", "patternProperties"] {
                if let Some(Value::Object(incoming)) = member.get(keyword) {
                    let target = out
                        .entry(keyword)
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(target) = target {
                        for (name, schema) in incoming {
                            target.entry(name.clone()).or_insert_with(|| schema.clone());
                        }
                    }
                }
            }
            if let Some(additional) = member.get("additionalProperties") {
                out.entry("additionalProperties")
                    .or_insert_with(|| additional.clone());
            }
        }

        if out.contains_key("type") || members.is_empty() {
            return;
        }
        let first = members[0].get("type");
        if first.is_some() && members.iter().all(|m| m.get("type") == first) {
            if let Some(kind) = first {
                out.insert("type".to_string(), kind.clone());
            }
            if let Some(items) = members.iter().find_map(|m| m.get("items")) {
                out.entry("items").or_insert_with(|| items.clone());
            }
        }
    }
}

/// Whether a schema describes an object (explicit type or object keywords)
pub fn is_object_shaped(schema: &Value) -> bool {
    match schema.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind.as_str() == Some("object")),
        _ => {
            schema.get("properties").is_some()
                || schema.get("patternProperties").is_some()
                || schema.get("additionalProperties").is_some()
        }
    }
}
