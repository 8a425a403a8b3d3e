//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating scalar item
//! sequences, their schemas and their raw wire form.

#![cfg(test)]

use crate::types::ParameterLocation;
use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Scalar item kinds with a lossless text form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Integer,
    Boolean,
    String,
}

impl ItemKind {
    pub fn schema(&self) -> Value {
        match self {
            ItemKind::Integer => json!({"type": "integer"}),
            ItemKind::Boolean => json!({"type": "boolean"}),
            ItemKind::String => json!({"type": "string"}),
        }
    }
}

/// Strategy for generating locations
pub fn location_strategy() -> impl Strategy<Value = ParameterLocation> {
    prop_oneof![
        Just(ParameterLocation::Path),
        Just(ParameterLocation::Query),
        Just(ParameterLocation::Header),
        Just(ParameterLocation::Cookie),
        Just(ParameterLocation::Form),
    ]
}

/// Strategy for a single item of a kind
pub fn item_strategy(kind: ItemKind) -> BoxedStrategy<Value> {
    match kind {
        ItemKind::Integer => any::<i64>().prop_map(Value::from).boxed(),
        ItemKind::Boolean => any::<bool>().prop_map(Value::from).boxed(),
        // Non-empty and free of delimiters, so the text form splits back unambiguously.
        ItemKind::String => "[a-zA-Z0-9_.-]{1,16}".prop_map(Value::from).boxed(),
    }
}

/// Strategy for an item kind and a homogeneous sequence of that kind
pub fn item_sequence_strategy() -> impl Strategy<Value = (ItemKind, Vec<Value>)> {
    prop_oneof![
        Just(ItemKind::Integer),
        Just(ItemKind::Boolean),
        Just(ItemKind::String),
    ]
    .prop_flat_map(|kind| (Just(kind), vec(item_strategy(kind), 0..12)))
}

/// Raw text form of a scalar item
pub fn item_to_raw(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{SimpleDelimiter, StyleOptions, StyleParser};
    use crate::request::RequestParameters;
    use crate::types::ParameterStyle;

    proptest! {
        #[test]
        fn test_simple_array_round_trip(
            (kind, items) in item_sequence_strategy(),
            delimiter in prop_oneof![Just(SimpleDelimiter::Comma), Just(SimpleDelimiter::Pipe)],
            location in location_strategy(),
        ) {
            let schema = json!({"type": "array", "items": kind.schema()});
            let options = StyleOptions { delimiter, ..StyleOptions::default() };
            let parser = StyleParser::for_schema("list", ParameterStyle::Simple, location, &schema, &options).unwrap();

            let raw = items
                .iter()
                .map(item_to_raw)
                .collect::<Vec<_>>()
                .join(&delimiter.as_char().to_string());
            let params = RequestParameters::new().with(location, "list", raw);

            let parsed = parser.parse(location, "list", &params).unwrap();
            prop_assert_eq!(parsed, Some(Value::Array(items)));
        }

        #[test]
        fn test_exploded_array_round_trip((kind, items) in item_sequence_strategy()) {
            let schema = json!({"type": "array", "items": kind.schema()});
            let parser = StyleParser::for_schema(
                "list",
                ParameterStyle::ExplodedArray,
                ParameterLocation::Query,
                &schema,
                &StyleOptions::default(),
            ).unwrap();

            let mut params = RequestParameters::new();
            for item in &items {
                params.insert(ParameterLocation::Query, "list", item_to_raw(item));
            }

            let parsed = parser.parse(ParameterLocation::Query, "list", &params).unwrap();
            let expected = if items.is_empty() { None } else { Some(Value::Array(items)) };
            prop_assert_eq!(parsed, expected);
        }
    }
}
