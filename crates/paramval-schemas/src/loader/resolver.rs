//! Reference resolution and schema normalization
//!
//! This module handles:
//! - Rewriting local `$ref`s (`#/...`) into absolute namespace URIs
//! - Discovering referenced fragments so they can be registered once
//! - Following bare reference chains to their target schema
//! - Detecting dangling references and content-less reference cycles
//!
//! Resolution works on the identity of a location, never by inlining: a
//! fragment that is already known (registered, discovered in this pass, or
//! currently being walked) is not walked again. That keeps mutual and
//! self-referencing schemas finite.
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::pointer::JsonPointer;
use crate::loader::registry::SchemaRegistry;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Keywords whose values are data, not sub-schemas
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "example", "examples"];

/// Keywords whose values map arbitrary names to sub-schemas
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "definitions", "$defs", "dependencies"];

/// Outcome of normalizing one schema
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Location of the resolved schema (the final target of a bare `$ref`)
    pub location: JsonPointer,
    /// Self-contained schema with every reference in the namespace form
    pub schema: Value,
    /// Fragments found during this pass that the registry did not know yet
    pub discovered: BTreeMap<JsonPointer, Value>,
}

#[derive(Default)]
struct ResolutionState {
    discovered: BTreeMap<JsonPointer, Value>,
    in_progress: HashSet<JsonPointer>,
}

/// Resolver for `$ref` pointers against a registry's root document
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> SchemaResolver<'r> {
    /// Create a resolver reading from the registry
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Normalize a schema found at `location`
    ///
    /// The returned `discovered` map must be registered with the registry
    /// before any validator compiled from `schema` is used.
    pub fn normalize(&self, schema: &Value, location: &JsonPointer) -> LoaderResult<Normalized> {
        let (location, body) = self.follow_bare_refs(schema, location)?;
        let mut state = ResolutionState::default();
        let schema = self.walk(body, &location, &mut state)?;

        if !state.discovered.is_empty() {
            debug!(
                location = %location,
                discovered = state.discovered.len(),
                "normalized schema with new fragments"
            );
        }

        Ok(Normalized {
            location,
            schema,
            discovered: state.discovered,
        })
    }

    /// Return the schema a bare `$ref` points to, or the schema itself
    pub fn solve_if_needed(&self, schema: &Value) -> LoaderResult<Value> {
        let (_, body) = self.follow_bare_refs(schema, &JsonPointer::root())?;
        Ok(body.clone())
    }

    /// Collect every `$ref` string in a schema
    pub fn extract_references(schema: &Value) -> BTreeSet<String> {
        let mut references = BTreeSet::new();
        Self::extract_refs_recursive(schema, &mut references);
        references
    }

    fn extract_refs_recursive(value: &Value, references: &mut BTreeSet<String>) {
        match value {
            Value::Object(obj) => {
                if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                    references.insert(reference.to_string());
                }
                for (key, val) in obj {
                    if DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    match val {
                        Value::Object(entries) if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) => {
                            for entry in entries.values() {
                                Self::extract_refs_recursive(entry, references);
                            }
                        }
                        _ => Self::extract_refs_recursive(val, references),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    Self::extract_refs_recursive(item, references);
                }
            }
            _ => {}
        }
    }

    /// Follow a chain of reference nodes until a schema body is reached
    fn follow_bare_refs<'a>(
        &'a self,
        schema: &'a Value,
        location: &JsonPointer,
    ) -> LoaderResult<(JsonPointer, &'a Value)> {
        let mut current = schema;
        let mut current_location = location.clone();
        let mut chain: Vec<String> = Vec::new();

        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            let target = self.reference_target(reference, &current_location)?;
            let target_str = target.to_string();
            if chain.contains(&target_str) {
                chain.push(target_str);
                return Err(LoaderError::reference_cycle(&chain));
            }
            chain.push(target_str);

            current = self.registry.lookup(&target).ok_or_else(|| {
                LoaderError::schema_resolution(
                    reference,
                    current_location.to_string(),
                    "target not found in document",
                )
            })?;
            current_location = target;
        }

        Ok((current_location, current))
    }

    fn reference_target(&self, reference: &str, location: &JsonPointer) -> LoaderResult<JsonPointer> {
        if reference.starts_with('#') {
            JsonPointer::from_reference(reference)
        } else if JsonPointer::is_namespaced(reference) {
            JsonPointer::from_uri(reference).ok_or_else(|| {
                LoaderError::schema_resolution(
                    reference,
                    location.to_string(),
                    "malformed namespace URI",
                )
            })
        } else {
            Err(LoaderError::unsupported_reference(reference, location.to_string()))
        }
    }

    fn walk(
        &self,
        value: &Value,
        location: &JsonPointer,
        state: &mut ResolutionState,
    ) -> LoaderResult<Value> {
        match value {
            Value::Object(obj) => {
                let mut out = Map::with_capacity(obj.len());
                for (key, val) in obj {
                    if key == "$ref" {
                        if let Some(reference) = val.as_str() {
                            let target = self.reference_target(reference, location)?;
                            self.discover(&target, reference, location, state)?;
                            out.insert(key.clone(), Value::String(target.to_uri()));
                            continue;
                        }
                    }
                    let child = location.append(key.as_str());
                    let walked = match val {
                        _ if DATA_KEYWORDS.contains(&key.as_str()) => val.clone(),
                        Value::Object(entries) if SCHEMA_MAP_KEYWORDS.contains(&key.as_str()) => {
                            self.walk_schema_map(entries, &child, state)?
                        }
                        _ => self.walk(val, &child, state)?,
                    };
                    out.insert(key.clone(), walked);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.walk(item, &location.append(i.to_string()), state))
                .collect::<LoaderResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    /// Walk a name-to-schema map; the names are never keywords
    fn walk_schema_map(
        &self,
        entries: &Map<String, Value>,
        location: &JsonPointer,
        state: &mut ResolutionState,
    ) -> LoaderResult<Value> {
        let mut out = Map::with_capacity(entries.len());
        for (name, schema) in entries {
            out.insert(name.clone(), self.walk(schema, &location.append(name.as_str()), state)?);
        }
        Ok(Value::Object(out))
    }

    fn discover(
        &self,
        target: &JsonPointer,
        reference: &str,
        location: &JsonPointer,
        state: &mut ResolutionState,
    ) -> LoaderResult<()> {
        if self.registry.contains(target)
            || state.discovered.contains_key(target)
            || state.in_progress.contains(target)
        {
            return Ok(());
        }

        let fragment = self.registry.lookup(target).ok_or_else(|| {
            LoaderError::schema_resolution(
                reference,
                location.to_string(),
                "target not found in document",
            )
        })?;
        // A fragment that is only a reference must eventually reach content.
        self.follow_bare_refs(fragment, target)?;

        state.in_progress.insert(target.clone());
        let normalized = self.walk(fragment, target, state)?;
        state.in_progress.remove(target);

        debug!(pointer = %target, "discovered schema fragment");
        state.discovered.insert(target.clone(), normalized);
        Ok(())
    }
}
