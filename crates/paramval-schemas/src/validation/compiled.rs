//! Draft-07 validators compiled from normalized schemas
//!
//! A [`CompiledValidator`] is built once per parameter from a normalized
//! schema and an immutable [`RegistrySnapshot`]. References to fragments are
//! served by a local retriever over the snapshot; nothing is fetched from
//! the network.
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::loader::pointer::JsonPointer;
use crate::loader::registry::RegistrySnapshot;
use crate::loader::resolver::SchemaResolver;
use crate::validation::base::{SchemaValidator, ValidationResult};
use crate::validation::error::{SchemaViolation, ValidatorBuildError, Violation};
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Serves namespace URIs from a registry snapshot
struct SnapshotRetriever {
    snapshot: RegistrySnapshot,
}

impl Retrieve for SnapshotRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        self.snapshot
            .get(uri_str)
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

/// An immutable validator bound to one normalized schema
pub struct CompiledValidator {
    validator: Validator,
    schema: Arc<Value>,
    max_violations: usize,
}

impl CompiledValidator {
    /// Compile a normalized schema against the fragments of a snapshot
    pub fn compile(schema: &Value, snapshot: &RegistrySnapshot) -> Result<Self, ValidatorBuildError> {
        Self::check_fragments(schema, snapshot)?;

        let retriever = SnapshotRetriever {
            snapshot: snapshot.clone(),
        };
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .with_retriever(retriever)
            .build(schema)
            .map_err(|e| ValidatorBuildError::Compile {
                reason: e.to_string(),
            })?;

        debug!(fragments = snapshot.len(), "compiled schema validator");

        Ok(Self {
            validator,
            schema: Arc::new(schema.clone()),
            max_violations: 0,
        })
    }

    /// Cap the number of violations retained per report (0 = unlimited)
    pub fn with_max_violations(mut self, max_violations: usize) -> Self {
        self.max_violations = max_violations;
        self
    }

    /// The schema this validator was compiled from
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Every namespaced reference reachable from the schema must be in the snapshot
    fn check_fragments(schema: &Value, snapshot: &RegistrySnapshot) -> Result<(), ValidatorBuildError> {
        let mut pending: Vec<&Value> = vec![schema];
        let mut seen: HashSet<String> = HashSet::new();

        while let Some(current) = pending.pop() {
            for reference in SchemaResolver::extract_references(current) {
                if !JsonPointer::is_namespaced(&reference) || !seen.insert(reference.clone()) {
                    continue;
                }
                let fragment = snapshot
                    .get(&reference)
                    .ok_or_else(|| ValidatorBuildError::UnknownFragment {
                        uri: reference.clone(),
                    })?;
                pending.push(fragment);
            }
        }
        Ok(())
    }
}

impl SchemaValidator for CompiledValidator {
    fn validate(&self, value: &Value) -> ValidationResult<()> {
        let mut errors = self.validator.iter_errors(value).peekable();
        if errors.peek().is_none() {
            return Ok(());
        }

        let limit = if self.max_violations == 0 {
            usize::MAX
        } else {
            self.max_violations
        };
        let mut violations = Vec::new();
        let mut truncated = false;
        for error in errors {
            if violations.len() == limit {
                truncated = true;
                break;
            }
            violations.push(Violation::new(
                error.instance_path.to_string(),
                error.schema_path.to_string(),
                error.to_string(),
            ));
        }

        Err(SchemaViolation::new(violations, truncated))
    }

    fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}

impl fmt::Debug for CompiledValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledValidator")
            .field("schema", &self.schema)
            .field("max_violations", &self.max_violations)
            .finish()
    }
}
