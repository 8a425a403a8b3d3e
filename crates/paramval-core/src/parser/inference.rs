//! Parser inference from fake schemas
//!
//! Every parser tree is derived once, at build time, from the fake schema of
//! a parameter. The functions here read only shape keywords: `type`,
//! `items`, `additionalItems`, `properties`, `patternProperties` and
//! `additionalProperties`.

use crate::parser::value::ValueParser;
use paramval_schemas::is_object_shaped;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Parser and default value for one tuple position
#[derive(Debug, Clone, PartialEq)]
pub struct TupleSlot {
    /// Parser for the raw token at this position
    pub parser: ValueParser,
    /// Value used when the position is missing
    pub default: Option<Value>,
}

/// How object keys without a declared property are handled
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// Parsed with the additional-properties schema's parser
    Parse(ValueParser),
    /// Kept as raw strings (`true`, or `false` so the validator rejects them)
    Keep,
    /// Ignored (`additionalProperties` absent)
    Drop,
}

/// Coarse shape of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaShape {
    /// Anything that is neither an array nor an object
    Scalar,
    /// Array with a single item schema
    Array,
    /// Array with positional item schemas
    Tuple,
    /// Object
    Object,
}

impl SchemaShape {
    /// Shape of a fake schema
    pub fn of(schema: &Value) -> Self {
        match primary_type(schema) {
            Some("object") => SchemaShape::Object,
            Some("array") => Self::array_shape(schema),
            Some(_) => SchemaShape::Scalar,
            None if is_object_shaped(schema) => SchemaShape::Object,
            None if schema.get("items").is_some() => Self::array_shape(schema),
            None => SchemaShape::Scalar,
        }
    }

    fn array_shape(schema: &Value) -> Self {
        if schema.get("items").map(Value::is_array).unwrap_or(false) {
            SchemaShape::Tuple
        } else {
            SchemaShape::Array
        }
    }
}

/// Schema-driven inference of value parsers
pub struct ValueParserInference;

impl ValueParserInference {
    /// Parser for a value of this schema held in a single token
    pub fn infer(schema: &Value) -> ValueParser {
        match SchemaShape::of(schema) {
            SchemaShape::Object => ValueParser::JsonObject,
            SchemaShape::Array | SchemaShape::Tuple => ValueParser::JsonArray,
            SchemaShape::Scalar => match primary_type(schema) {
                Some("boolean") => ValueParser::Boolean,
                Some("integer") => ValueParser::Integer,
                Some("number") => ValueParser::Number,
                Some("string") => ValueParser::String,
                _ => ValueParser::Noop,
            },
        }
    }

    /// Parser for the items of an array schema
    pub fn item_parser(schema: &Value) -> ValueParser {
        match schema.get("items") {
            Some(items) if items.is_object() => Self::infer(items),
            _ => ValueParser::Noop,
        }
    }

    /// Positional parsers of a tuple schema
    pub fn tuple_slots(schema: &Value) -> Vec<TupleSlot> {
        schema
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| TupleSlot {
                        parser: Self::infer(item),
                        default: item.get("default").cloned(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parser for tuple items beyond the declared positions
    ///
    /// `None` means extra items are a grammar error.
    pub fn additional_items_parser(schema: &Value) -> Option<ValueParser> {
        match schema.get("additionalItems") {
            Some(Value::Bool(true)) => Some(ValueParser::Noop),
            Some(additional) if additional.is_object() => Some(Self::infer(additional)),
            _ => None,
        }
    }

    /// Declared properties and their parsers, in declaration order
    pub fn property_parsers(schema: &Value) -> Vec<(String, ValueParser)> {
        schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), Self::infer(property)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pattern properties compiled to regexes, in declaration order
    pub fn pattern_property_parsers(
        schema: &Value,
        case_insensitive: bool,
    ) -> Result<Vec<(Regex, ValueParser)>, regex::Error> {
        let Some(patterns) = schema.get("patternProperties").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        patterns
            .iter()
            .map(|(pattern, property)| {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(case_insensitive)
                    .build()?;
                Ok((regex, Self::infer(property)))
            })
            .collect()
    }

    /// Policy for keys matched by neither properties nor patterns
    pub fn additional_properties(schema: &Value) -> AdditionalProperties {
        match schema.get("additionalProperties") {
            None => AdditionalProperties::Drop,
            Some(Value::Bool(_)) => AdditionalProperties::Keep,
            Some(additional) => AdditionalProperties::Parse(Self::infer(additional)),
        }
    }
}

/// The first non-null `type` of a schema
fn primary_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(kind) => Some(kind.as_str()),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null"),
        _ => None,
    }
}
