//! Request-level predicates
//!
//! Checks that look at a request as a whole rather than at one parameter,
//! such as body presence or constraints across several parameters.

use crate::request::RequestParameters;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A request predicate rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Predicate '{predicate}' failed: {message}")]
pub struct PredicateFailure {
    pub predicate: String,
    pub message: String,
}

/// Outcome of one predicate
pub type PredicateResult = Result<(), PredicateFailure>;

type Check = dyn Fn(&RequestParameters) -> PredicateResult + Send + Sync;

/// A named pass/fail check over a whole request
#[derive(Clone)]
pub struct RequestPredicate {
    name: String,
    check: Arc<Check>,
}

impl RequestPredicate {
    /// Wrap a check function
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RequestParameters) -> PredicateResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the check
    pub fn test(&self, params: &RequestParameters) -> PredicateResult {
        (self.check)(params)
    }
}

impl fmt::Debug for RequestPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Reject requests without a body
pub fn body_required() -> RequestPredicate {
    RequestPredicate::new("body_required", |params| {
        if params.has_body() {
            Ok(())
        } else {
            Err(PredicateFailure {
                predicate: "body_required".to_string(),
                message: "Body required".to_string(),
            })
        }
    })
}
