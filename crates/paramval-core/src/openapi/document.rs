//! OpenAPI document access
//!
//! Reads operations and parameter objects from a loaded OpenAPI 3 document.
//! Only the parts needed to build request validators are interpreted.

use crate::error::{Error, Result};
use crate::types::ParameterLocation;
use paramval_schemas::{JsonPointer, SchemaParser};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// A located operation of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRef {
    pub operation_id: String,
    pub method: String,
    pub path: String,
    /// Pointer to the operation object
    pub pointer: JsonPointer,
}

impl OperationRef {
    /// Pointer to the path item holding the operation
    pub fn path_item_pointer(&self) -> JsonPointer {
        JsonPointer::from_segments(["paths", self.path.as_str()])
    }
}

/// A parameter object with its `$ref` resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDefinition {
    pub name: String,
    pub location: ParameterLocation,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub required: bool,
    pub schema: Value,
    /// Pointer to `schema` inside the document
    pub schema_pointer: JsonPointer,
}

/// A loaded OpenAPI document
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    root: Arc<Value>,
}

impl OpenApiDocument {
    /// Load a YAML or JSON document
    pub fn from_file(path: &Path) -> Result<Self> {
        let root = SchemaParser::new().parse_file(path)?;
        debug!(path = %path.display(), "loaded OpenAPI document");
        Self::from_value(root)
    }

    /// Wrap an already parsed document
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.get("paths").map(Value::is_object).unwrap_or(false) {
            return Err(Error::invalid_definition("/paths", "document has no paths object"));
        }
        Ok(Self { root: Arc::new(root) })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Shared handle on the document
    pub fn shared_root(&self) -> Arc<Value> {
        Arc::clone(&self.root)
    }

    /// Every operation carrying an `operationId`, in document order
    pub fn operations(&self) -> Vec<OperationRef> {
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut operations = Vec::new();
        for (path, item) in paths {
            for method in HTTP_METHODS {
                let Some(operation) = item.get(*method) else {
                    continue;
                };
                match operation.get("operationId").and_then(Value::as_str) {
                    Some(operation_id) => operations.push(OperationRef {
                        operation_id: operation_id.to_string(),
                        method: method.to_string(),
                        path: path.clone(),
                        pointer: JsonPointer::from_segments(["paths", path.as_str(), *method]),
                    }),
                    None => warn!(path = %path, method = %method, "skipping operation without operationId"),
                }
            }
        }
        operations
    }

    /// Locate an operation by its `operationId`
    pub fn find_operation(&self, operation_id: &str) -> Result<OperationRef> {
        self.operations()
            .into_iter()
            .find(|op| op.operation_id == operation_id)
            .ok_or_else(|| Error::OperationNotFound {
                operation_id: operation_id.to_string(),
            })
    }

    /// The operation object itself
    pub fn operation(&self, op: &OperationRef) -> Result<&Value> {
        op.pointer
            .query(&self.root)
            .ok_or_else(|| Error::invalid_definition(&op.pointer, "operation disappeared"))
    }

    /// Path-level and operation-level parameters, merged
    ///
    /// An operation-level parameter replaces a path-level one with the same
    /// name and location. Path-level parameters come first.
    pub fn parameters(&self, op: &OperationRef) -> Result<Vec<ParameterDefinition>> {
        let mut merged: Vec<ParameterDefinition> = Vec::new();
        let sources = [op.path_item_pointer(), op.pointer.clone()];

        for source in &sources {
            let list = source.append("parameters");
            let Some(items) = list.query(&self.root).and_then(Value::as_array) else {
                continue;
            };
            for index in 0..items.len() {
                let definition = self.parameter(&list.append(index.to_string()))?;
                match merged
                    .iter_mut()
                    .find(|p| p.location == definition.location && p.name == definition.name)
                {
                    Some(existing) => *existing = definition,
                    None => merged.push(definition),
                }
            }
        }
        Ok(merged)
    }

    /// Whether the operation declares a required request body
    pub fn request_body_required(&self, op: &OperationRef) -> Result<bool> {
        let pointer = op.pointer.append("requestBody");
        let Some(body) = pointer.query(&self.root) else {
            return Ok(false);
        };
        let (_, body) = self.dereference(body, pointer)?;
        Ok(body.get("required").and_then(Value::as_bool).unwrap_or(false))
    }

    fn parameter(&self, pointer: &JsonPointer) -> Result<ParameterDefinition> {
        let raw = pointer
            .query(&self.root)
            .ok_or_else(|| Error::invalid_definition(pointer, "missing parameter"))?;
        let (pointer, object) = self.dereference(raw, pointer.clone())?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_definition(&pointer, "parameter has no name"))?;
        let location_name = object
            .get("in")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_definition(&pointer, "parameter has no 'in'"))?;
        let location = ParameterLocation::from_openapi(location_name).ok_or_else(|| {
            Error::invalid_definition(&pointer, format!("unknown parameter location '{}'", location_name))
        })?;
        let schema = object.get("schema").cloned().ok_or_else(|| {
            Error::invalid_definition(&pointer, format!("parameter '{}' has no schema", name))
        })?;

        // Path parameters are always required.
        let required = location == ParameterLocation::Path
            || object.get("required").and_then(Value::as_bool).unwrap_or(false);

        Ok(ParameterDefinition {
            name: name.to_string(),
            location,
            style: object.get("style").and_then(Value::as_str).map(str::to_string),
            explode: object.get("explode").and_then(Value::as_bool),
            required,
            schema,
            schema_pointer: pointer.append("schema"),
        })
    }

    /// Follow `$ref` chains of non-schema objects
    fn dereference<'a>(&'a self, mut value: &'a Value, mut pointer: JsonPointer) -> Result<(JsonPointer, &'a Value)> {
        let mut seen = HashSet::new();
        while let Some(reference) = value.get("$ref").and_then(Value::as_str) {
            if !seen.insert(pointer.clone()) {
                return Err(Error::invalid_definition(&pointer, "reference cycle"));
            }
            let target = JsonPointer::from_reference(reference)?;
            value = target.query(&self.root).ok_or_else(|| {
                Error::invalid_definition(&pointer, format!("unresolvable reference '{}'", reference))
            })?;
            pointer = target;
        }
        Ok((pointer, value))
    }
}
