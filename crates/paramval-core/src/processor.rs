//! Per-parameter request processing
//!
//! A [`ParameterProcessor`] is the compiled form of one parameter
//! descriptor: presence check, style parser and schema validator. It is
//! immutable once built and can be shared across request threads.

use crate::parser::{ParseError, StyleParser};
use crate::request::RequestParameters;
use crate::types::{ParameterLocation, ParameterStyle};
use paramval_schemas::{SchemaValidator, SchemaViolation};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// A parsed and validated parameter value
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub value: Value,
}

/// Coarse reason of a parameter failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required parameter has no raw value
    MissingParameter,
    /// A raw value breaks the grammar of its style
    ParseError,
    /// A parsed value fails its schema
    NoMatch,
}

impl ErrorKind {
    /// Stable reason code for the routing layer
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingParameter => "MISSING_PARAMETER",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::NoMatch => "NO_MATCH",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Detailed cause behind a failure code
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    Parse(ParseError),
    Schema(SchemaViolation),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Parse(e) => write!(f, "{}", e),
            FailureCause::Schema(e) => write!(f, "{}", e),
        }
    }
}

/// A parameter failed processing
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ParameterProcessorError {
    pub name: String,
    pub location: ParameterLocation,
    pub kind: ErrorKind,
    pub cause: Option<FailureCause>,
}

impl fmt::Display for ParameterProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {} parameter '{}'", self.kind, self.location, self.name)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl ParameterProcessorError {
    /// The stable reason code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// The schema violations, for `NO_MATCH` failures
    pub fn violation(&self) -> Option<&SchemaViolation> {
        match &self.cause {
            Some(FailureCause::Schema(violation)) => Some(violation),
            _ => None,
        }
    }
}

/// Outcome of processing one parameter; `Ok(None)` for an absent optional one
pub type ValidationResult = Result<Option<RequestParameter>, ParameterProcessorError>;

/// Compiled processor for one parameter
#[derive(Clone)]
pub struct ParameterProcessor {
    name: String,
    location: ParameterLocation,
    style: ParameterStyle,
    required: bool,
    parser: StyleParser,
    validator: Arc<dyn SchemaValidator>,
}

impl ParameterProcessor {
    /// Assemble a processor from its compiled parts
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        style: ParameterStyle,
        required: bool,
        parser: StyleParser,
        validator: Arc<dyn SchemaValidator>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            style,
            required,
            parser,
            validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn style(&self) -> ParameterStyle {
        self.style
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn parser(&self) -> &StyleParser {
        &self.parser
    }

    /// Check presence, parse, then validate
    pub fn process(&self, params: &RequestParameters) -> ValidationResult {
        if !self.parser.is_present(self.location, &self.name, params) {
            if self.required {
                trace!(parameter = %self.name, location = %self.location, "required parameter missing");
                return Err(self.failure(ErrorKind::MissingParameter, None));
            }
            return Ok(None);
        }

        let value = match self.parser.parse(self.location, &self.name, params) {
            Ok(Some(value)) => value,
            Ok(None) if self.required => return Err(self.failure(ErrorKind::MissingParameter, None)),
            Ok(None) => return Ok(None),
            Err(e) => {
                trace!(parameter = %self.name, error = %e, "parameter parse failed");
                return Err(self.failure(ErrorKind::ParseError, Some(FailureCause::Parse(e))));
            }
        };

        if let Err(violation) = self.validator.validate(&value) {
            trace!(
                parameter = %self.name,
                violations = violation.len(),
                "parameter does not match schema"
            );
            return Err(self.failure(ErrorKind::NoMatch, Some(FailureCause::Schema(violation))));
        }

        trace!(parameter = %self.name, location = %self.location, "parameter accepted");
        Ok(Some(RequestParameter {
            name: self.name.clone(),
            location: self.location,
            value,
        }))
    }

    fn failure(&self, kind: ErrorKind, cause: Option<FailureCause>) -> ParameterProcessorError {
        ParameterProcessorError {
            name: self.name.clone(),
            location: self.location,
            kind,
            cause,
        }
    }
}

impl fmt::Debug for ParameterProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterProcessor")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("style", &self.style)
            .field("required", &self.required)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StyleOptions;
    use paramval_schemas::{compile_validator, RegistrySnapshot, ValidationResult as SchemaResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingValidator {
        calls: AtomicUsize,
    }

    impl SchemaValidator for CountingValidator {
        fn validate(&self, _value: &Value) -> SchemaResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn integer_processor(required: bool) -> ParameterProcessor {
        let schema = json!({"type": "integer"});
        let parser = StyleParser::for_schema(
            "id",
            ParameterStyle::Simple,
            ParameterLocation::Query,
            &schema,
            &StyleOptions::default(),
        )
        .unwrap();
        let validator = compile_validator(&schema, &RegistrySnapshot::default(), 10).unwrap();
        ParameterProcessor::new("id", ParameterLocation::Query, ParameterStyle::Simple, required, parser, Arc::new(validator))
    }

    #[test]
    fn test_integer_accepted() {
        let params = RequestParameters::from_query_string("id=42");
        let parameter = integer_processor(true).process(&params).unwrap().unwrap();
        assert_eq!(parameter.value, json!(42));
        assert_eq!(parameter.location, ParameterLocation::Query);
    }

    #[test]
    fn test_uncoercible_value_is_no_match() {
        let params = RequestParameters::from_query_string("id=forty-two");
        let err = integer_processor(true).process(&params).unwrap_err();
        assert_eq!(err.code(), "NO_MATCH");
        assert!(!err.violation().unwrap().is_empty());
    }

    #[test]
    fn test_missing_parameter() {
        let params = RequestParameters::new();
        let err = integer_processor(true).process(&params).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingParameter);
        assert!(err.cause.is_none());
        assert_eq!(integer_processor(false).process(&params).unwrap(), None);
    }

    #[test]
    fn test_absent_optional_skips_validation() {
        let validator = Arc::new(CountingValidator {
            calls: AtomicUsize::new(0),
        });
        let parser = StyleParser::SimpleScalar {
            parser: crate::parser::ValueParser::String,
        };
        let processor = ParameterProcessor::new(
            "q",
            ParameterLocation::Query,
            ParameterStyle::Simple,
            false,
            parser,
            validator.clone(),
        );

        assert_eq!(processor.process(&RequestParameters::new()).unwrap(), None);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);

        processor.process(&RequestParameters::from_query_string("q=x")).unwrap();
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_error_kind() {
        let schema = json!({"type": "array", "items": [{"type": "integer"}, {"type": "integer"}]});
        let parser = StyleParser::for_schema(
            "pt",
            ParameterStyle::Simple,
            ParameterLocation::Path,
            &schema,
            &StyleOptions::default(),
        )
        .unwrap();
        let validator = compile_validator(&schema, &RegistrySnapshot::default(), 0).unwrap();
        let processor =
            ParameterProcessor::new("pt", ParameterLocation::Path, ParameterStyle::Simple, true, parser, Arc::new(validator));

        let params = RequestParameters::new().with(ParameterLocation::Path, "pt", "1");
        let err = processor.process(&params).unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
        assert!(matches!(err.cause, Some(FailureCause::Parse(ParseError::MissingTupleItems { .. }))));
        assert!(err.to_string().starts_with("PARSE_ERROR for path parameter 'pt'"));
    }

    #[test]
    fn test_form_names_are_case_sensitive() {
        let schema = json!({"type": "integer"});
        let parser = StyleParser::for_schema(
            "Count",
            ParameterStyle::Simple,
            ParameterLocation::Form,
            &schema,
            &StyleOptions::default(),
        )
        .unwrap();
        let validator = compile_validator(&schema, &RegistrySnapshot::default(), 0).unwrap();
        let processor =
            ParameterProcessor::new("Count", ParameterLocation::Form, ParameterStyle::Simple, true, parser, Arc::new(validator));

        let exact = RequestParameters::new().with(ParameterLocation::Form, "Count", "3");
        let parameter = processor.process(&exact).unwrap().unwrap();
        assert_eq!(parameter.value, json!(3));
        assert_eq!(parameter.location, ParameterLocation::Form);

        let lowercase = RequestParameters::new().with(ParameterLocation::Form, "count", "3");
        assert_eq!(processor.process(&lowercase).unwrap_err().kind, ErrorKind::MissingParameter);

        let wrong_location = RequestParameters::new().with(ParameterLocation::Query, "Count", "3");
        assert_eq!(processor.process(&wrong_location).unwrap_err().kind, ErrorKind::MissingParameter);
    }
}
