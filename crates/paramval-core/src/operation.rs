//! Operation-level request validation
//!
//! A [`RequestValidator`] groups the processors and predicates built for one
//! operation. Every parameter is evaluated so that the caller receives the
//! complete failure report of a request.

use crate::predicate::{PredicateFailure, RequestPredicate};
use crate::processor::{ParameterProcessor, ParameterProcessorError, RequestParameter};
use crate::request::RequestParameters;
use crate::types::ParameterLocation;
use serde_json::Value;
use tracing::debug;

/// Outcome of validating a request against an operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestValidation {
    /// Accepted parameters, in declaration order
    pub parameters: Vec<RequestParameter>,
    /// Failed parameters
    pub failures: Vec<ParameterProcessorError>,
    /// Failed request predicates
    pub predicate_failures: Vec<PredicateFailure>,
}

impl RequestValidation {
    /// Whether neither a parameter nor a predicate failed
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty() && self.predicate_failures.is_empty()
    }

    /// The accepted value of a parameter
    pub fn get(&self, location: ParameterLocation, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.location == location && location.names_match(&p.name, name))
            .map(|p| &p.value)
    }
}

/// Processors and predicates of one operation
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    operation_id: Option<String>,
    processors: Vec<ParameterProcessor>,
    predicates: Vec<RequestPredicate>,
    fail_fast: bool,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the validator with the operation it belongs to
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_processor(mut self, processor: ParameterProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn with_predicate(mut self, predicate: RequestPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Stop at the first failing parameter
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    pub fn processors(&self) -> &[ParameterProcessor] {
        &self.processors
    }

    pub fn predicates(&self) -> &[RequestPredicate] {
        &self.predicates
    }

    /// Run every processor, then every predicate
    pub fn validate(&self, params: &RequestParameters) -> RequestValidation {
        let mut outcome = RequestValidation::default();

        for processor in &self.processors {
            match processor.process(params) {
                Ok(Some(parameter)) => outcome.parameters.push(parameter),
                Ok(None) => {}
                Err(failure) => {
                    outcome.failures.push(failure);
                    if self.fail_fast {
                        break;
                    }
                }
            }
        }

        if !(self.fail_fast && !outcome.failures.is_empty()) {
            outcome.predicate_failures = self
                .predicates
                .iter()
                .filter_map(|predicate| predicate.test(params).err())
                .collect();
        }

        if !outcome.is_valid() {
            debug!(
                operation = self.operation_id.as_deref().unwrap_or("<anonymous>"),
                failures = outcome.failures.len(),
                predicate_failures = outcome.predicate_failures.len(),
                "request rejected"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{StyleOptions, StyleParser};
    use crate::predicate::body_required;
    use crate::types::ParameterStyle;
    use paramval_schemas::{compile_validator, RegistrySnapshot};
    use serde_json::json;
    use std::sync::Arc;

    fn processor(name: &str, schema: Value, required: bool) -> ParameterProcessor {
        let parser = StyleParser::for_schema(
            name,
            ParameterStyle::Simple,
            ParameterLocation::Query,
            &schema,
            &StyleOptions::default(),
        )
        .unwrap();
        let validator = compile_validator(&schema, &RegistrySnapshot::default(), 10).unwrap();
        ParameterProcessor::new(name, ParameterLocation::Query, ParameterStyle::Simple, required, parser, Arc::new(validator))
    }

    fn validator() -> RequestValidator {
        RequestValidator::new()
            .with_operation_id("listPets")
            .with_processor(processor("limit", json!({"type": "integer", "maximum": 100}), true))
            .with_processor(processor("tag", json!({"type": "string"}), true))
            .with_processor(processor("page", json!({"type": "integer"}), false))
            .with_predicate(body_required())
    }

    #[test]
    fn test_collects_all_failures() {
        let outcome = validator().validate(&RequestParameters::from_query_string("limit=500"));

        assert!(!outcome.is_valid());
        let codes: Vec<_> = outcome.failures.iter().map(|f| (f.name.as_str(), f.code())).collect();
        assert_eq!(codes, vec![("limit", "NO_MATCH"), ("tag", "MISSING_PARAMETER")]);
        assert_eq!(outcome.predicate_failures.len(), 1);
    }

    #[test]
    fn test_valid_request() {
        let mut params = RequestParameters::from_query_string("limit=10&tag=cat");
        params.set_body_present(true);
        let outcome = validator().validate(&params);

        assert!(outcome.is_valid());
        assert_eq!(outcome.get(ParameterLocation::Query, "limit"), Some(&json!(10)));
        assert_eq!(outcome.get(ParameterLocation::Query, "page"), None);
    }

    #[test]
    fn test_fail_fast() {
        let outcome = validator()
            .fail_fast(true)
            .validate(&RequestParameters::from_query_string("limit=500"));

        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.predicate_failures.is_empty());
    }
}
