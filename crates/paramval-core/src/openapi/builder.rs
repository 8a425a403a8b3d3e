//! Request validators for OpenAPI operations
//!
//! Maps every parameter object of an operation (`in`, `style`, `explode`,
//! `required`, `schema`) to a [`ParameterProcessor`] and the request body
//! flag to a predicate.

use crate::config::EngineConfig;
use crate::dsl::{BuildContext, StyledProcessorFactory};
use crate::error::{Error, Result};
use crate::openapi::context::GeneratorContext;
use crate::openapi::document::{OpenApiDocument, ParameterDefinition};
use crate::operation::RequestValidator;
use crate::parser::{ObjectEncoding, SchemaShape, SimpleDelimiter};
use crate::predicate::body_required;
use crate::types::{ParameterLocation, ParameterStyle};
use paramval_schemas::SchemaRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// How a parameter object is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub style: ParameterStyle,
    pub delimiter: SimpleDelimiter,
    pub encoding: ObjectEncoding,
}

impl ResolvedStyle {
    fn new(style: ParameterStyle) -> Self {
        Self {
            style,
            delimiter: SimpleDelimiter::Comma,
            encoding: ObjectEncoding::Pairs,
        }
    }

    /// Resolve the OpenAPI `style`/`explode` pair against the parameter's shape
    pub fn of(definition: &ParameterDefinition, fake_schema: &Value) -> Result<Self> {
        let style = definition
            .style
            .as_deref()
            .unwrap_or(match definition.location {
                ParameterLocation::Path | ParameterLocation::Header => "simple",
                _ => "form",
            });
        let explode = definition.explode.unwrap_or(style == "form");
        let shape = SchemaShape::of(fake_schema);

        let resolved = match style {
            "simple" => Self {
                encoding: if explode {
                    ObjectEncoding::Assignments
                } else {
                    ObjectEncoding::Pairs
                },
                ..Self::new(ParameterStyle::Simple)
            },
            "form" if explode => match shape {
                SchemaShape::Scalar => Self::new(ParameterStyle::Simple),
                SchemaShape::Object => Self::new(ParameterStyle::ExplodedObject),
                SchemaShape::Array | SchemaShape::Tuple => Self::new(ParameterStyle::ExplodedArray),
            },
            "form" => Self::new(ParameterStyle::Simple),
            "spaceDelimited" | "pipeDelimited" if explode => Self::new(ParameterStyle::ExplodedArray),
            "spaceDelimited" => Self {
                delimiter: SimpleDelimiter::Space,
                ..Self::new(ParameterStyle::Simple)
            },
            "pipeDelimited" => Self {
                delimiter: SimpleDelimiter::Pipe,
                ..Self::new(ParameterStyle::Simple)
            },
            "deepObject" => Self::new(ParameterStyle::DeepObject),
            other => {
                return Err(Error::UnsupportedStyle {
                    parameter: definition.name.clone(),
                    location: definition.location.to_string(),
                    style: other.to_string(),
                })
            }
        };
        Ok(resolved)
    }
}

/// Builds request validators for the operations of one document
///
/// The registry is shared by every operation built here, so a fragment
/// referenced from several operations is registered once.
#[derive(Debug)]
pub struct OperationBuilder {
    document: OpenApiDocument,
    registry: SchemaRegistry,
    config: EngineConfig,
}

impl OperationBuilder {
    pub fn new(document: OpenApiDocument, config: EngineConfig) -> Self {
        let registry = SchemaRegistry::new(document.root().clone());
        Self {
            document,
            registry,
            config,
        }
    }

    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Build the validator of one operation
    pub fn build(&mut self, operation_id: &str) -> Result<RequestValidator> {
        let op = self.document.find_operation(operation_id)?;
        let definitions = self.document.parameters(&op)?;

        let mut ctx = GeneratorContext::new(&mut self.registry);
        let mut holders = Vec::with_capacity(definitions.len());
        for definition in &definitions {
            holders.push(ctx.schema_holder(&definition.schema, definition.schema_pointer.clone())?);
        }
        if self.document.request_body_required(&op)? {
            ctx.add_predicate(body_required());
        }
        let snapshot = ctx.snapshot();
        let predicates = ctx.into_predicates();

        let build_ctx = BuildContext::new(self.config.clone())
            .with_snapshot(snapshot)
            .with_document(self.document.shared_root());

        let mut validator = RequestValidator::new()
            .with_operation_id(operation_id)
            .fail_fast(self.config.validation.fail_fast);

        for (definition, holder) in definitions.iter().zip(&holders) {
            let resolved = ResolvedStyle::of(definition, holder.fake())?;
            let siblings = definitions
                .iter()
                .filter(|other| other.location == definition.location && other.name != definition.name)
                .map(|other| other.name.clone());

            let processor = StyledProcessorFactory::new(
                definition.name.clone(),
                resolved.style,
                holder.normalized().clone(),
            )
            .with_fake_schema(holder.fake().clone())
            .required(definition.required)
            .delimiter(resolved.delimiter)
            .object_encoding(resolved.encoding)
            .reserved_names(siblings)
            .build(definition.location, &build_ctx)?;

            validator = validator.with_processor(processor);
        }
        for predicate in predicates {
            validator = validator.with_predicate(predicate);
        }

        debug!(
            operation = operation_id,
            parameters = definitions.len(),
            fragments = self.registry.len(),
            "built operation validator"
        );
        Ok(validator)
    }

    /// Build the validators of every operation, keyed by `operationId`
    pub fn build_all(&mut self) -> Result<BTreeMap<String, RequestValidator>> {
        let mut validators = BTreeMap::new();
        for op in self.document.operations() {
            let validator = self.build(&op.operation_id)?;
            validators.insert(op.operation_id, validator);
        }
        info!(operations = validators.len(), "built request validators");
        Ok(validators)
    }
}
