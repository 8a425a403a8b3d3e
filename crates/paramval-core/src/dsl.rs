//! Programmatic parameter definitions
//!
//! Schema builders produce draft-07 JSON. Factory functions pair a name, a
//! style and a schema into a [`StyledProcessorFactory`], which builds an
//! immutable [`ParameterProcessor`] for a location.
//!
//! # Example
//!
//! ```rust
//! use paramval_core::dsl::{deep_object_param, int_schema, object_schema, BuildContext};
//! use paramval_core::{ParameterLocation, RequestParameters};
//!
//! let processor = deep_object_param(
//!     "color",
//!     object_schema()
//!         .property("r", int_schema().minimum(0).maximum(255))
//!         .property("g", int_schema().minimum(0).maximum(255))
//!         .allow_additional_properties(false),
//! )
//! .build(ParameterLocation::Query, &BuildContext::default())
//! .unwrap();
//!
//! let params = RequestParameters::from_query_string("color[r]=255&color[g]=0");
//! let parameter = processor.process(&params).unwrap().unwrap();
//! assert_eq!(parameter.value, serde_json::json!({"r": 255, "g": 0}));
//! ```

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::parser::{ObjectEncoding, SchemaShape, SimpleDelimiter, StyleOptions, StyleParser};
use crate::processor::ParameterProcessor;
use crate::types::{ParameterLocation, ParameterStyle};
use paramval_schemas::{compile_validator, FakeSchemaGenerator, RegistrySnapshot, SchemaValidator};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Anything that renders to a JSON schema
pub trait SchemaBuilder {
    fn to_schema(&self) -> Value;
}

impl SchemaBuilder for Value {
    fn to_schema(&self) -> Value {
        self.clone()
    }
}

macro_rules! keyword_setters {
    ($($method:ident => $keyword:literal;)*) => {
        $(
            pub fn $method(mut self, value: impl Into<Value>) -> Self {
                self.schema.insert($keyword.to_string(), value.into());
                self
            }
        )*
    };
}

/// Builder for scalar schemas
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSchemaBuilder {
    schema: Map<String, Value>,
}

impl ScalarSchemaBuilder {
    fn of_type(kind: &str) -> Self {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(kind));
        Self { schema }
    }

    keyword_setters! {
        minimum => "minimum";
        maximum => "maximum";
        exclusive_minimum => "exclusiveMinimum";
        exclusive_maximum => "exclusiveMaximum";
        min_length => "minLength";
        max_length => "maxLength";
        pattern => "pattern";
        format => "format";
    }

    /// Restrict to a set of values
    pub fn enum_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.schema.insert("enum".to_string(), Value::Array(values));
        self
    }

    /// Default value (used for missing tuple slots)
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.schema.insert("default".to_string(), value.into());
        self
    }
}

impl SchemaBuilder for ScalarSchemaBuilder {
    fn to_schema(&self) -> Value {
        Value::Object(self.schema.clone())
    }
}

pub fn string_schema() -> ScalarSchemaBuilder {
    ScalarSchemaBuilder::of_type("string")
}

pub fn int_schema() -> ScalarSchemaBuilder {
    ScalarSchemaBuilder::of_type("integer")
}

pub fn number_schema() -> ScalarSchemaBuilder {
    ScalarSchemaBuilder::of_type("number")
}

pub fn boolean_schema() -> ScalarSchemaBuilder {
    ScalarSchemaBuilder::of_type("boolean")
}

/// Builder for homogeneous array schemas
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchemaBuilder {
    items: Option<Value>,
    min_items: Option<u64>,
    max_items: Option<u64>,
    unique_items: bool,
}

impl ArraySchemaBuilder {
    pub fn items(mut self, items: impl SchemaBuilder) -> Self {
        self.items = Some(items.to_schema());
        self
    }

    pub fn min_items(mut self, min: u64) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: u64) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn unique_items(mut self) -> Self {
        self.unique_items = true;
        self
    }
}

impl SchemaBuilder for ArraySchemaBuilder {
    fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("array"));
        if let Some(items) = &self.items {
            schema.insert("items".to_string(), items.clone());
        }
        if let Some(min) = self.min_items {
            schema.insert("minItems".to_string(), json!(min));
        }
        if let Some(max) = self.max_items {
            schema.insert("maxItems".to_string(), json!(max));
        }
        if self.unique_items {
            schema.insert("uniqueItems".to_string(), json!(true));
        }
        Value::Object(schema)
    }
}

pub fn array_schema() -> ArraySchemaBuilder {
    ArraySchemaBuilder::default()
}

/// Builder for positional array schemas
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleSchemaBuilder {
    items: Vec<Value>,
    additional_items: Option<Value>,
}

impl TupleSchemaBuilder {
    /// Append a positional item
    pub fn item(mut self, item: impl SchemaBuilder) -> Self {
        self.items.push(item.to_schema());
        self
    }

    /// Schema for items beyond the declared positions
    pub fn additional_items(mut self, schema: impl SchemaBuilder) -> Self {
        self.additional_items = Some(schema.to_schema());
        self
    }

    pub fn allow_additional_items(mut self, allow: bool) -> Self {
        self.additional_items = Some(Value::Bool(allow));
        self
    }
}

impl SchemaBuilder for TupleSchemaBuilder {
    fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("array"));
        schema.insert("items".to_string(), Value::Array(self.items.clone()));
        if let Some(additional) = &self.additional_items {
            schema.insert("additionalItems".to_string(), additional.clone());
        }
        Value::Object(schema)
    }
}

pub fn tuple_schema() -> TupleSchemaBuilder {
    TupleSchemaBuilder::default()
}

/// Builder for object schemas
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchemaBuilder {
    properties: Map<String, Value>,
    pattern_properties: Map<String, Value>,
    additional_properties: Option<Value>,
    required: Vec<String>,
}

impl ObjectSchemaBuilder {
    pub fn property(mut self, name: impl Into<String>, schema: impl SchemaBuilder) -> Self {
        self.properties.insert(name.into(), schema.to_schema());
        self
    }

    pub fn required_property(mut self, name: impl Into<String>, schema: impl SchemaBuilder) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, schema.to_schema());
        self
    }

    /// Schema for keys matching a regex
    pub fn pattern_property(mut self, pattern: impl Into<String>, schema: impl SchemaBuilder) -> Self {
        self.pattern_properties.insert(pattern.into(), schema.to_schema());
        self
    }

    pub fn additional_properties(mut self, schema: impl SchemaBuilder) -> Self {
        self.additional_properties = Some(schema.to_schema());
        self
    }

    pub fn allow_additional_properties(mut self, allow: bool) -> Self {
        self.additional_properties = Some(Value::Bool(allow));
        self
    }
}

impl SchemaBuilder for ObjectSchemaBuilder {
    fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        if !self.properties.is_empty() {
            schema.insert("properties".to_string(), Value::Object(self.properties.clone()));
        }
        if !self.pattern_properties.is_empty() {
            schema.insert(
                "patternProperties".to_string(),
                Value::Object(self.pattern_properties.clone()),
            );
        }
        if let Some(additional) = &self.additional_properties {
            schema.insert("additionalProperties".to_string(), additional.clone());
        }
        if !self.required.is_empty() {
            schema.insert("required".to_string(), json!(self.required));
        }
        Value::Object(schema)
    }
}

pub fn object_schema() -> ObjectSchemaBuilder {
    ObjectSchemaBuilder::default()
}

/// Shared inputs for building processors
#[derive(Debug, Clone)]
pub struct BuildContext {
    config: EngineConfig,
    snapshot: RegistrySnapshot,
    document: Arc<Value>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl BuildContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            snapshot: RegistrySnapshot::default(),
            document: Arc::new(Value::Object(Map::new())),
        }
    }

    /// Fragments that normalized schemas may reference
    pub fn with_snapshot(mut self, snapshot: RegistrySnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Document against which fake schemas resolve local references
    pub fn with_document(mut self, document: Arc<Value>) -> Self {
        self.document = document;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Derive the fake schema of a schema
    pub fn fake_schema(&self, schema: &Value) -> Value {
        FakeSchemaGenerator::new(&self.document).generate(schema)
    }

    /// Compile a validator with the configured violation cap
    pub fn compile(&self, schema: &Value) -> Result<Arc<dyn SchemaValidator>> {
        let validator = compile_validator(schema, &self.snapshot, self.config.validation.max_violations)?;
        Ok(Arc::new(validator))
    }
}

/// A parameter definition waiting for its location
#[derive(Debug, Clone)]
pub struct StyledProcessorFactory {
    name: String,
    style: ParameterStyle,
    schema: Value,
    fake_schema: Option<Value>,
    expected_shape: Option<SchemaShape>,
    required: bool,
    options: StyleOptions,
}

impl StyledProcessorFactory {
    /// Define a parameter; required unless marked otherwise
    pub fn new(name: impl Into<String>, style: ParameterStyle, schema: impl SchemaBuilder) -> Self {
        Self {
            name: name.into(),
            style,
            schema: schema.to_schema(),
            fake_schema: None,
            expected_shape: None,
            required: true,
            options: StyleOptions::default(),
        }
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn delimiter(mut self, delimiter: SimpleDelimiter) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    pub fn object_encoding(mut self, encoding: ObjectEncoding) -> Self {
        self.options.encoding = encoding;
        self
    }

    /// Names of sibling parameters an exploded object must not claim
    pub fn reserved_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.reserved_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Reject schemas of any other shape at build time
    pub fn expect_shape(mut self, shape: SchemaShape) -> Self {
        self.expected_shape = Some(shape);
        self
    }

    /// Use a precomputed fake schema instead of deriving one
    pub fn with_fake_schema(mut self, fake_schema: Value) -> Self {
        self.fake_schema = Some(fake_schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Build the processor for a location
    pub fn build(&self, location: ParameterLocation, ctx: &BuildContext) -> Result<ParameterProcessor> {
        let fake_schema = match &self.fake_schema {
            Some(fake) => fake.clone(),
            None => ctx.fake_schema(&self.schema),
        };
        if let Some(expected) = self.expected_shape {
            let shape = SchemaShape::of(&fake_schema);
            if shape != expected {
                return Err(Error::invalid_schema(
                    &self.name,
                    format!("expected a {:?} schema, found a {:?} schema", expected, shape),
                ));
            }
        }
        let mut options = self.options.clone();
        options.trim_whitespace |= ctx.config().parsing.trim_whitespace;

        let parser = StyleParser::for_schema(&self.name, self.style, location, &fake_schema, &options)?;
        let validator = ctx.compile(&self.schema)?;

        debug!(
            parameter = %self.name,
            location = %location,
            style = %self.style,
            required = self.required,
            "built parameter processor"
        );

        Ok(ParameterProcessor::new(
            self.name.clone(),
            location,
            self.style,
            self.required,
            parser,
            validator,
        ))
    }
}

/// Scalar in a single raw value
pub fn simple_param(name: impl Into<String>, schema: impl SchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::Simple, schema)
}

/// Array in one delimited raw value
pub fn array_param(name: impl Into<String>, schema: ArraySchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::Simple, schema).expect_shape(SchemaShape::Array)
}

/// Tuple in one delimited raw value
pub fn tuple_param(name: impl Into<String>, schema: TupleSchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::Simple, schema).expect_shape(SchemaShape::Tuple)
}

/// Object in one delimited raw value
pub fn object_param(name: impl Into<String>, schema: ObjectSchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::Simple, schema).expect_shape(SchemaShape::Object)
}

/// Array with one raw value per item
pub fn exploded_array_param(name: impl Into<String>, schema: impl SchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::ExplodedArray, schema)
}

/// Tuple with one raw value per item
pub fn exploded_tuple_param(name: impl Into<String>, schema: impl SchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::ExplodedTuple, schema)
}

/// Object with one raw value per property
pub fn exploded_object_param(name: impl Into<String>, schema: impl SchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::ExplodedObject, schema)
}

/// Object with one `name[property]` raw value per property
pub fn deep_object_param(name: impl Into<String>, schema: impl SchemaBuilder) -> StyledProcessorFactory {
    StyledProcessorFactory::new(name, ParameterStyle::DeepObject, schema)
}
