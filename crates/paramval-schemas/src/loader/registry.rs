//! Fragment registry for normalized schemas
//!
//! The registry is an arena of schema fragments indexed by the canonical
//! pointer of their location in the root document. Resolution records
//! references as URIs naming registry entries instead of inlining the
//! referenced schema, so shared and cyclic sub-schemas are stored once.
//!
//! The registry is mutated only while operations are being built. Compiled
//! validators capture an immutable [`RegistrySnapshot`], which is what makes
//! request-time validation lock-free.
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::loader::pointer::JsonPointer;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Index of a fragment inside the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(usize);

/// A normalized schema fragment and its location
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Location of the fragment in the root document
    pub pointer: JsonPointer,
    /// Normalized schema content
    pub schema: Value,
}

/// Build-time registry of schema fragments
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    root: Arc<Value>,
    fragments: Vec<Fragment>,
    index: HashMap<JsonPointer, FragmentId>,
}

impl SchemaRegistry {
    /// Create a registry over a root document (an OpenAPI or JSON Schema document)
    pub fn new(root: Value) -> Self {
        Self {
            root: Arc::new(root),
            fragments: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The document all pointers are relative to
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look a pointer up in the raw root document
    pub fn lookup(&self, pointer: &JsonPointer) -> Option<&Value> {
        pointer.query(&self.root)
    }

    /// Register a normalized fragment
    ///
    /// Registration is idempotent: the first schema registered at a pointer
    /// wins and later calls return the existing id.
    pub fn register(&mut self, pointer: JsonPointer, schema: Value) -> FragmentId {
        if let Some(id) = self.index.get(&pointer) {
            return *id;
        }
        let id = FragmentId(self.fragments.len());
        debug!(pointer = %pointer, id = id.0, "registered schema fragment");
        self.index.insert(pointer.clone(), id);
        self.fragments.push(Fragment { pointer, schema });
        id
    }

    /// Whether a fragment is registered at this pointer
    pub fn contains(&self, pointer: &JsonPointer) -> bool {
        self.index.contains_key(pointer)
    }

    /// Normalized schema registered at this pointer
    pub fn get(&self, pointer: &JsonPointer) -> Option<&Value> {
        self.index
            .get(pointer)
            .map(|id| &self.fragments[id.0].schema)
    }

    /// Fragment by id
    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.0)
    }

    /// Number of registered fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing has been registered yet
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Freeze the current fragments into a shareable URI-keyed map
    pub fn snapshot(&self) -> RegistrySnapshot {
        let by_uri = self
            .fragments
            .iter()
            .map(|fragment| (fragment.pointer.to_uri(), fragment.schema.clone()))
            .collect();
        RegistrySnapshot {
            by_uri: Arc::new(by_uri),
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

/// Immutable view of the registry, keyed by namespace URI
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    by_uri: Arc<HashMap<String, Value>>,
}

impl RegistrySnapshot {
    /// Fetch the schema behind a namespace URI
    pub fn get(&self, uri: &str) -> Option<&Value> {
        let uri = uri.split('#').next().unwrap_or(uri);
        if let Some(value) = self.by_uri.get(uri) {
            return Some(value);
        }
        // The URI may come back re-encoded by the validator's URI parser.
        JsonPointer::from_uri(uri).and_then(|pointer| self.by_uri.get(&pointer.to_uri()))
    }

    /// Number of fragments in the snapshot
    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    /// Whether the snapshot holds no fragment
    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = SchemaRegistry::default();
        let pointer = JsonPointer::parse("/components/schemas/Pet").unwrap();

        let first = registry.register(pointer.clone(), json!({"type": "object"}));
        let second = registry.register(pointer.clone(), json!({"type": "string"}));

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&pointer), Some(&json!({"type": "object"})));
        assert_eq!(registry.fragment(first).unwrap().pointer, pointer);
    }

    #[test]
    fn test_lookup_reads_root_document() {
        let registry = SchemaRegistry::new(json!({
            "components": {"schemas": {"Id": {"type": "integer"}}}
        }));
        let pointer = JsonPointer::parse("/components/schemas/Id").unwrap();
        assert_eq!(registry.lookup(&pointer), Some(&json!({"type": "integer"})));
        assert!(!registry.contains(&pointer));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = SchemaRegistry::default();
        let a = JsonPointer::parse("/definitions/A").unwrap();
        registry.register(a.clone(), json!({"type": "string"}));

        let snapshot = registry.snapshot();
        registry.register(JsonPointer::parse("/definitions/B").unwrap(), json!({}));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&a.to_uri()), Some(&json!({"type": "string"})));
        assert_eq!(
            snapshot.get(&format!("{}#", a.to_uri())),
            Some(&json!({"type": "string"}))
        );
    }
}
