//! Scalar and slot parsers
//!
//! A [`ValueParser`] turns one raw token into a JSON value. Coercion is
//! lenient: a token that does not look like the expected type is kept as a
//! JSON string and left for the schema validator to reject. Only embedded
//! JSON documents can fail to parse.

use crate::parser::ParseError;
use serde_json::{Number, Value};

/// Parser for a single raw token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueParser {
    /// `true` / `false`
    Boolean,
    /// Signed or unsigned 64-bit integer
    Integer,
    /// Integer or finite float
    Number,
    /// Verbatim string
    String,
    /// Embedded JSON object
    JsonObject,
    /// Embedded JSON array
    JsonArray,
    /// Untyped: kept as a string
    Noop,
}

impl ValueParser {
    /// Parse one raw token
    pub fn parse(&self, raw: &str) -> Result<Value, ParseError> {
        let value = match self {
            ValueParser::Boolean => match raw {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            ValueParser::Integer => parse_integer(raw).unwrap_or_else(|| Value::String(raw.to_string())),
            ValueParser::Number => parse_integer(raw)
                .or_else(|| {
                    raw.parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                })
                .unwrap_or_else(|| Value::String(raw.to_string())),
            ValueParser::JsonObject | ValueParser::JsonArray => {
                serde_json::from_str(raw).map_err(|e| ParseError::MalformedJson {
                    raw: raw.to_string(),
                    reason: e.to_string(),
                })?
            }
            ValueParser::String | ValueParser::Noop => Value::String(raw.to_string()),
        };
        Ok(value)
    }
}

fn parse_integer(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.parse::<u64>().ok().map(Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(ValueParser::Integer.parse("42").unwrap(), json!(42));
        assert_eq!(ValueParser::Integer.parse("-7").unwrap(), json!(-7));
        assert_eq!(ValueParser::Number.parse("2.5").unwrap(), json!(2.5));
        assert_eq!(ValueParser::Number.parse("3").unwrap(), json!(3));
        assert_eq!(ValueParser::Boolean.parse("true").unwrap(), json!(true));
        assert_eq!(ValueParser::String.parse("42").unwrap(), json!("42"));
    }

    #[test]
    fn test_failed_coercion_keeps_raw_string() {
        assert_eq!(ValueParser::Integer.parse("forty-two").unwrap(), json!("forty-two"));
        assert_eq!(ValueParser::Integer.parse("4.2").unwrap(), json!("4.2"));
        assert_eq!(ValueParser::Number.parse("NaN").unwrap(), json!("NaN"));
        assert_eq!(ValueParser::Boolean.parse("TRUE").unwrap(), json!("TRUE"));
    }

    #[test]
    fn test_embedded_json() {
        assert_eq!(
            ValueParser::JsonObject.parse(r#"{"a":1}"#).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(ValueParser::JsonArray.parse("[1,2]").unwrap(), json!([1, 2]));
        assert!(matches!(
            ValueParser::JsonObject.parse("{a:1}"),
            Err(ParseError::MalformedJson { .. })
        ));
    }
}
