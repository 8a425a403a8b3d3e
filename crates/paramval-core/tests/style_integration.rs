//! End-to-end tests for parameter processors built through the DSL
//!
//! These tests cover the style grammars together with schema validation
//! and the three failure codes.

use paramval_core::dsl::{
    array_schema, boolean_schema, deep_object_param, exploded_object_param, exploded_tuple_param,
    int_schema, object_param, object_schema, simple_param, string_schema, tuple_param,
    tuple_schema, BuildContext,
};
use paramval_core::parser::ObjectEncoding;
use paramval_core::{ErrorKind, FailureCause, ParameterLocation, ParseError, RequestParameters};
use serde_json::json;

fn query(raw: &str) -> RequestParameters {
    RequestParameters::from_query_string(raw)
}

#[test]
fn test_simple_integer() {
    let processor = simple_param("id", int_schema())
        .build(ParameterLocation::Query, &BuildContext::default())
        .expect("processor should build");

    let accepted = processor.process(&query("id=42")).unwrap().unwrap();
    assert_eq!(accepted.value, json!(42));

    // Coercion failures surface as schema failures
    let rejected = processor.process(&query("id=forty-two")).unwrap_err();
    assert_eq!(rejected.kind, ErrorKind::NoMatch);
    assert_eq!(rejected.violation().unwrap().first().unwrap().keyword, "type");
}

#[test]
fn test_deep_object_color() {
    let processor = deep_object_param(
        "color",
        object_schema()
            .property("r", int_schema())
            .property("g", int_schema())
            .allow_additional_properties(false),
    )
    .build(ParameterLocation::Query, &BuildContext::default())
    .unwrap();

    let accepted = processor
        .process(&query("color[r]=255&color[g]=0"))
        .unwrap()
        .unwrap();
    assert_eq!(accepted.value, json!({"r": 255, "g": 0}));

    let rejected = processor
        .process(&query("color[r]=255&color[x]=1"))
        .unwrap_err();
    assert_eq!(rejected.code(), "NO_MATCH");
    assert_eq!(rejected.violation().unwrap().first().unwrap().keyword, "additionalProperties");

    let malformed = processor.process(&query("color[r=1")).unwrap_err();
    assert_eq!(malformed.code(), "PARSE_ERROR");
}

#[test]
fn test_exploded_object_pattern_properties() {
    let processor = exploded_object_param(
        "extensions",
        object_schema()
            .pattern_property("^x-.*$", string_schema())
            .allow_additional_properties(false),
    )
    .optional()
    .build(ParameterLocation::Query, &BuildContext::default())
    .unwrap();

    let accepted = processor.process(&query("x-custom=foo")).unwrap().unwrap();
    assert_eq!(accepted.value, json!({"x-custom": "foo"}));

    let rejected = processor.process(&query("other=foo")).unwrap_err();
    assert_eq!(rejected.code(), "NO_MATCH");

    assert_eq!(processor.process(&query("")).unwrap(), None);
}

#[test]
fn test_tuple_arity() {
    let schema = tuple_schema()
        .item(int_schema())
        .item(boolean_schema())
        .additional_items(string_schema());
    let processor = tuple_param("t", schema.clone())
        .build(ParameterLocation::Path, &BuildContext::default())
        .unwrap();
    let path = |raw: &str| RequestParameters::new().with(ParameterLocation::Path, "t", raw);

    let accepted = processor.process(&path("1,true,a,b")).unwrap().unwrap();
    assert_eq!(accepted.value, json!([1, true, "a", "b"]));

    let short = processor.process(&path("1")).unwrap_err();
    assert_eq!(short.kind, ErrorKind::ParseError);
    assert_eq!(
        short.cause,
        Some(FailureCause::Parse(ParseError::MissingTupleItems { expected: 2, found: 1 }))
    );

    let exploded = exploded_tuple_param("t", schema.allow_additional_items(false))
        .build(ParameterLocation::Query, &BuildContext::default())
        .unwrap();
    let extra = exploded.process(&query("t=1&t=false&t=x")).unwrap_err();
    assert_eq!(extra.code(), "PARSE_ERROR");
}

#[test]
fn test_header_names_ignore_case() {
    let processor = simple_param("X-Request-Id", string_schema().min_length(1))
        .build(ParameterLocation::Header, &BuildContext::default())
        .unwrap();
    let params = RequestParameters::new().with(ParameterLocation::Header, "x-request-id", "abc");
    assert_eq!(processor.process(&params).unwrap().unwrap().value, json!("abc"));

    let query_processor = simple_param("Sort", string_schema())
        .build(ParameterLocation::Query, &BuildContext::default())
        .unwrap();
    let err = query_processor.process(&query("sort=asc")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingParameter);
}

#[test]
fn test_simple_object_assignments() {
    let processor = object_param(
        "point",
        object_schema()
            .required_property("x", int_schema())
            .required_property("y", int_schema()),
    )
    .object_encoding(ObjectEncoding::Assignments)
    .build(ParameterLocation::Path, &BuildContext::default())
    .unwrap();

    let params = RequestParameters::new().with(ParameterLocation::Path, "point", "x=1,y=2");
    assert_eq!(processor.process(&params).unwrap().unwrap().value, json!({"x": 1, "y": 2}));

    let missing_y = RequestParameters::new().with(ParameterLocation::Path, "point", "x=1");
    assert_eq!(processor.process(&missing_y).unwrap_err().code(), "NO_MATCH");

    let broken = RequestParameters::new().with(ParameterLocation::Path, "point", "x=1,y");
    assert_eq!(processor.process(&broken).unwrap_err().code(), "PARSE_ERROR");
}

#[test]
fn test_processors_are_shareable_across_threads() {
    let processor = std::sync::Arc::new(
        simple_param("n", array_schema().items(int_schema().maximum(10)))
            .build(ParameterLocation::Query, &BuildContext::default())
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let processor = processor.clone();
            std::thread::spawn(move || {
                let raw = format!("n={},{}", i, i + 8);
                processor.process(&RequestParameters::from_query_string(&raw)).is_ok()
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, true, true, false]);
}
