//! Style parsers
//!
//! One [`StyleParser`] variant per wire encoding. Each variant owns the
//! parser tree inferred for its schema and implements the same contract:
//! read the raw values of one parameter from a request and return the
//! structured value, `None` when the parameter is absent, or a
//! [`ParseError`] when the raw values break the style's grammar.

use crate::error::{Error, Result};
use crate::parser::inference::{AdditionalProperties, SchemaShape, TupleSlot, ValueParserInference};
use crate::parser::value::ValueParser;
use crate::parser::ParseError;
use crate::request::RequestParameters;
use crate::types::{ParameterLocation, ParameterStyle};
use regex::Regex;
use serde_json::{Map, Value};

/// Delimiter of non-exploded arrays, tuples and objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleDelimiter {
    /// `simple` and `form` styles
    #[default]
    Comma,
    /// `spaceDelimited` style
    Space,
    /// `pipeDelimited` style
    Pipe,
}

impl SimpleDelimiter {
    /// The delimiter character
    pub fn as_char(&self) -> char {
        match self {
            SimpleDelimiter::Comma => ',',
            SimpleDelimiter::Space => ' ',
            SimpleDelimiter::Pipe => '|',
        }
    }
}

/// Layout of a non-exploded object value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectEncoding {
    /// `k1,v1,k2,v2`
    #[default]
    Pairs,
    /// `k1=v1,k2=v2`
    Assignments,
}

/// Splits a delimited raw value into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tokenizer {
    pub delimiter: SimpleDelimiter,
    pub trim: bool,
}

impl Tokenizer {
    /// Split a raw value; the empty string has no tokens
    pub fn split<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        if raw.is_empty() {
            return Vec::new();
        }
        raw.split(self.delimiter.as_char())
            .map(|token| if self.trim { token.trim() } else { token })
            .collect()
    }
}

/// Build-time options that refine a style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOptions {
    /// Delimiter for simple arrays, tuples and objects
    pub delimiter: SimpleDelimiter,
    /// Layout for simple objects
    pub encoding: ObjectEncoding,
    /// Names of sibling parameters in the same location
    pub reserved_names: Vec<String>,
    /// Trim whitespace around delimited tokens
    pub trim_whitespace: bool,
}

/// Positional parsers of a tuple
#[derive(Debug, Clone, PartialEq)]
pub struct TupleLayout {
    slots: Vec<TupleSlot>,
    additional: Option<ValueParser>,
}

impl TupleLayout {
    /// Infer the layout of a tuple schema
    pub fn for_schema(schema: &Value) -> Self {
        Self {
            slots: ValueParserInference::tuple_slots(schema),
            additional: ValueParserInference::additional_items_parser(schema),
        }
    }

    /// Assemble a tuple from its tokens
    pub fn parse(&self, tokens: &[&str]) -> std::result::Result<Value, ParseError> {
        let mut items = Vec::with_capacity(tokens.len().max(self.slots.len()));

        for (index, slot) in self.slots.iter().enumerate() {
            match (tokens.get(index), &slot.default) {
                (Some(token), _) => items.push(slot.parser.parse(token)?),
                (None, Some(default)) => items.push(default.clone()),
                (None, None) => {
                    return Err(ParseError::MissingTupleItems {
                        expected: self.slots.len(),
                        found: tokens.len(),
                    })
                }
            }
        }

        if tokens.len() > self.slots.len() {
            let parser = self.additional.ok_or(ParseError::UnexpectedTupleItems {
                allowed: self.slots.len(),
                found: tokens.len(),
            })?;
            for token in &tokens[self.slots.len()..] {
                items.push(parser.parse(token)?);
            }
        }

        Ok(Value::Array(items))
    }
}

/// Property routing of an object
#[derive(Debug, Clone)]
pub struct ObjectLayout {
    properties: Vec<(String, ValueParser)>,
    patterns: Vec<(Regex, ValueParser)>,
    additional: AdditionalProperties,
}

impl ObjectLayout {
    /// Infer the layout of an object schema
    ///
    /// Pattern properties match case-insensitively in case-insensitive
    /// locations.
    pub fn for_schema(schema: &Value, location: ParameterLocation) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            properties: ValueParserInference::property_parsers(schema),
            patterns: ValueParserInference::pattern_property_parsers(
                schema,
                !location.is_case_sensitive(),
            )?,
            additional: ValueParserInference::additional_properties(schema),
        })
    }

    /// Find the output key and parser for a raw key
    ///
    /// Returns `None` for keys that are dropped. A `None` parser keeps the
    /// raw string.
    pub fn route(&self, location: ParameterLocation, key: &str) -> Option<(String, Option<ValueParser>)> {
        if let Some((name, parser)) = self
            .properties
            .iter()
            .find(|(name, _)| location.names_match(name, key))
        {
            return Some((name.clone(), Some(*parser)));
        }
        if let Some((_, parser)) = self.patterns.iter().find(|(regex, _)| regex.is_match(key)) {
            return Some((key.to_string(), Some(*parser)));
        }
        match self.additional {
            AdditionalProperties::Parse(parser) => Some((key.to_string(), Some(parser))),
            AdditionalProperties::Keep => Some((key.to_string(), None)),
            AdditionalProperties::Drop => None,
        }
    }

    /// Assemble an object from raw key/value pairs
    ///
    /// When a key repeats, its first value wins.
    pub fn collect<'a, I>(&self, location: ParameterLocation, pairs: I) -> std::result::Result<Map<String, Value>, ParseError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut object = Map::new();
        for (key, raw) in pairs {
            let Some((key, parser)) = self.route(location, key) else {
                continue;
            };
            if object.contains_key(&key) {
                continue;
            }
            let value = match parser {
                Some(parser) => parser.parse(raw)?,
                None => Value::String(raw.to_string()),
            };
            object.insert(key, value);
        }
        Ok(object)
    }
}

/// Parser for one serialization style
#[derive(Debug, Clone)]
pub enum StyleParser {
    /// One raw string holding a scalar
    SimpleScalar { parser: ValueParser },
    /// One delimited raw string holding array items
    SimpleArray { items: ValueParser, tokenizer: Tokenizer },
    /// One delimited raw string holding tuple items
    SimpleTuple { layout: TupleLayout, tokenizer: Tokenizer },
    /// One delimited raw string holding object entries
    SimpleObject {
        layout: ObjectLayout,
        tokenizer: Tokenizer,
        encoding: ObjectEncoding,
    },
    /// One raw value per array item
    ExplodedArray { items: ValueParser },
    /// One raw value per tuple item
    ExplodedTuple { layout: TupleLayout },
    /// One raw value per property, named after the property
    ExplodedObject {
        layout: ObjectLayout,
        reserved_names: Vec<String>,
    },
    /// One raw value per property, named `name[property]`
    DeepObject { layout: ObjectLayout },
}

impl StyleParser {
    /// Build the parser for a style from a fake schema
    pub fn for_schema(
        name: &str,
        style: ParameterStyle,
        location: ParameterLocation,
        fake_schema: &Value,
        options: &StyleOptions,
    ) -> Result<Self> {
        let shape = SchemaShape::of(fake_schema);
        let tokenizer = Tokenizer {
            delimiter: options.delimiter,
            trim: options.trim_whitespace,
        };
        let object_layout = || {
            ObjectLayout::for_schema(fake_schema, location).map_err(|e| {
                Error::invalid_schema(name, format!("invalid patternProperties regex: {}", e))
            })
        };

        let parser = match (style, shape) {
            (ParameterStyle::Simple, SchemaShape::Scalar) => StyleParser::SimpleScalar {
                parser: ValueParserInference::infer(fake_schema),
            },
            (ParameterStyle::Simple, SchemaShape::Array) => StyleParser::SimpleArray {
                items: ValueParserInference::item_parser(fake_schema),
                tokenizer,
            },
            (ParameterStyle::Simple, SchemaShape::Tuple) => StyleParser::SimpleTuple {
                layout: TupleLayout::for_schema(fake_schema),
                tokenizer,
            },
            (ParameterStyle::Simple, SchemaShape::Object) => StyleParser::SimpleObject {
                layout: object_layout()?,
                tokenizer,
                encoding: options.encoding,
            },
            (ParameterStyle::ExplodedArray | ParameterStyle::ExplodedTuple, SchemaShape::Array) => {
                StyleParser::ExplodedArray {
                    items: ValueParserInference::item_parser(fake_schema),
                }
            }
            (ParameterStyle::ExplodedArray | ParameterStyle::ExplodedTuple, SchemaShape::Tuple) => {
                StyleParser::ExplodedTuple {
                    layout: TupleLayout::for_schema(fake_schema),
                }
            }
            (ParameterStyle::ExplodedObject, SchemaShape::Object) => StyleParser::ExplodedObject {
                layout: object_layout()?,
                reserved_names: options.reserved_names.clone(),
            },
            (ParameterStyle::DeepObject, SchemaShape::Object) => StyleParser::DeepObject {
                layout: object_layout()?,
            },
            (style, shape) => {
                return Err(Error::invalid_schema(
                    name,
                    format!("style {} cannot encode a {:?} schema", style, shape),
                ))
            }
        };
        Ok(parser)
    }

    /// Whether the request carries any raw value for this parameter
    pub fn is_present(&self, location: ParameterLocation, name: &str, params: &RequestParameters) -> bool {
        match self {
            StyleParser::ExplodedObject {
                layout,
                reserved_names,
            } => Self::exploded_entries(location, params, reserved_names)
                .any(|(key, _)| layout.route(location, key).is_some()),
            StyleParser::DeepObject { .. } => {
                let prefix = location.normalize_name(name);
                params
                    .entries(location)
                    .any(|(key, _)| key.strip_prefix(&*prefix).is_some_and(|rest| rest.starts_with('[')))
            }
            _ => params.contains(location, name),
        }
    }

    /// Parse the raw values of a parameter; `None` when absent
    pub fn parse(
        &self,
        location: ParameterLocation,
        name: &str,
        params: &RequestParameters,
    ) -> std::result::Result<Option<Value>, ParseError> {
        match self {
            StyleParser::SimpleScalar { parser } => params
                .first(location, name)
                .map(|raw| parser.parse(raw))
                .transpose(),
            StyleParser::SimpleArray { items, tokenizer } => params
                .first(location, name)
                .map(|raw| {
                    tokenizer
                        .split(raw)
                        .into_iter()
                        .map(|token| items.parse(token))
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map(Value::Array)
                })
                .transpose(),
            StyleParser::SimpleTuple { layout, tokenizer } => params
                .first(location, name)
                .map(|raw| layout.parse(&tokenizer.split(raw)))
                .transpose(),
            StyleParser::SimpleObject {
                layout,
                tokenizer,
                encoding,
            } => params
                .first(location, name)
                .map(|raw| Self::parse_simple_object(layout, location, tokenizer, *encoding, raw))
                .transpose(),
            StyleParser::ExplodedArray { items } => {
                let raws = params.get_all(location, name);
                if raws.is_empty() {
                    return Ok(None);
                }
                raws.into_iter()
                    .map(|raw| items.parse(raw))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(|values| Some(Value::Array(values)))
            }
            StyleParser::ExplodedTuple { layout } => {
                let raws = params.get_all(location, name);
                if raws.is_empty() {
                    return Ok(None);
                }
                layout.parse(&raws).map(Some)
            }
            StyleParser::ExplodedObject {
                layout,
                reserved_names,
            } => {
                let object = layout.collect(
                    location,
                    Self::exploded_entries(location, params, reserved_names),
                )?;
                Ok((!object.is_empty()).then_some(Value::Object(object)))
            }
            StyleParser::DeepObject { layout } => {
                let prefix = location.normalize_name(name);
                let mut pairs = Vec::new();
                for (key, raw) in params.entries(location) {
                    if let Some(property) = Self::subscript(key, &prefix)? {
                        pairs.push((property, raw));
                    }
                }
                if pairs.is_empty() {
                    return Ok(None);
                }
                layout.collect(location, pairs).map(|object| Some(Value::Object(object)))
            }
        }
    }

    fn parse_simple_object(
        layout: &ObjectLayout,
        location: ParameterLocation,
        tokenizer: &Tokenizer,
        encoding: ObjectEncoding,
        raw: &str,
    ) -> std::result::Result<Value, ParseError> {
        let tokens = tokenizer.split(raw);
        let pairs: Vec<(&str, &str)> = match encoding {
            ObjectEncoding::Pairs => {
                if tokens.len() % 2 != 0 {
                    return Err(ParseError::UnbalancedObject {
                        raw: raw.to_string(),
                        count: tokens.len(),
                    });
                }
                tokens.chunks(2).map(|pair| (pair[0], pair[1])).collect()
            }
            ObjectEncoding::Assignments => tokens
                .iter()
                .map(|entry| {
                    entry.split_once('=').ok_or_else(|| ParseError::InvalidAssignment {
                        entry: entry.to_string(),
                    })
                })
                .collect::<std::result::Result<_, _>>()?,
        };
        layout.collect(location, pairs).map(Value::Object)
    }

    fn exploded_entries<'p>(
        location: ParameterLocation,
        params: &'p RequestParameters,
        reserved_names: &'p [String],
    ) -> impl Iterator<Item = (&'p str, &'p str)> + 'p {
        params
            .entries(location)
            .filter(move |(key, _)| !reserved_names.iter().any(|reserved| location.names_match(reserved, key)))
    }

    /// Extract `property` from `prefix[property]`
    ///
    /// Keys with another prefix are not ours; keys with our prefix and a
    /// broken subscript are a grammar error.
    fn subscript<'k>(key: &'k str, prefix: &str) -> std::result::Result<Option<&'k str>, ParseError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('[')) else {
            return Ok(None);
        };
        match rest.strip_suffix(']') {
            Some(property) if !property.is_empty() && !property.contains(['[', ']']) => Ok(Some(property)),
            _ => Err(ParseError::MalformedSubscript {
                key: key.to_string(),
            }),
        }
    }
}
