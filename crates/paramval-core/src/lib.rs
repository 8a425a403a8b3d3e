//! Paramval Core - request parameter parsing and validation engine
//!
//! This crate turns OpenAPI parameter descriptors into immutable processors
//! that parse raw request values according to their serialization style and
//! validate the result against a compiled JSON schema.
//!
//! # Main Components
//!
//! - **Parsing**: style parsers for simple, exploded and deep-object values,
//!   inferred from fake schemas
//! - **Processing**: presence check, parse and validate, reduced to the
//!   stable codes `MISSING_PARAMETER`, `PARSE_ERROR` and `NO_MATCH`
//! - **DSL**: schema builders and per-style processor factories
//! - **OpenAPI**: per-operation validators built from a document
//! - **Ambient**: configuration files, environment overrides and logging
//!
//! # Example
//!
//! ```rust
//! use paramval_core::openapi::{OpenApiDocument, OperationBuilder};
//! use paramval_core::{EngineConfig, RequestParameters};
//! use serde_json::json;
//!
//! let document = OpenApiDocument::from_value(json!({
//!     "openapi": "3.0.3",
//!     "paths": {
//!         "/items": {
//!             "get": {
//!                 "operationId": "listItems",
//!                 "parameters": [
//!                     {"name": "limit", "in": "query", "required": true,
//!                      "schema": {"type": "integer", "maximum": 100}}
//!                 ]
//!             }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let mut builder = OperationBuilder::new(document, EngineConfig::default());
//! let validator = builder.build("listItems").unwrap();
//!
//! let outcome = validator.validate(&RequestParameters::from_query_string("limit=500"));
//! assert_eq!(outcome.failures[0].code(), "NO_MATCH");
//! ```

pub mod config;
pub mod dsl;
pub mod error;
pub mod logging;
pub mod openapi;
pub mod operation;
pub mod parser;
pub mod predicate;
pub mod processor;
pub mod request;
pub mod types;

mod proptest_strategies;

// Re-export main types for convenience
pub use config::{ConfigFormat, EngineConfig, LogFormat, LoggingConfig, ParsingConfig, ValidationConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use operation::{RequestValidation, RequestValidator};
pub use parser::{ParseError, StyleParser, ValueParser};
pub use predicate::{body_required, PredicateFailure, PredicateResult, RequestPredicate};
pub use processor::{
    ErrorKind, FailureCause, ParameterProcessor, ParameterProcessorError, RequestParameter, ValidationResult,
};
pub use request::RequestParameters;
pub use types::{ParameterLocation, ParameterStyle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ErrorKind::MissingParameter.code(), "MISSING_PARAMETER");
        assert_eq!(ErrorKind::ParseError.code(), "PARSE_ERROR");
        assert_eq!(ErrorKind::NoMatch.code(), "NO_MATCH");
    }
}
