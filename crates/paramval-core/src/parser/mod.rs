//! Style-aware parsing of raw parameter values
//!
//! Parsing is split in two layers:
//! - [`ValueParser`] turns one raw token into a JSON value
//! - [`StyleParser`] applies the grammar of a serialization style to the
//!   raw values of a request and assembles scalars, arrays, tuples and
//!   objects from the tokens
//!
//! Parser trees are inferred once from a fake schema through
//! [`ValueParserInference`] and are immutable afterwards.

pub mod inference;
pub mod style;
pub mod value;

pub use inference::{AdditionalProperties, SchemaShape, TupleSlot, ValueParserInference};
pub use style::{ObjectEncoding, ObjectLayout, SimpleDelimiter, StyleOptions, StyleParser, Tokenizer, TupleLayout};
pub use value::ValueParser;

use thiserror::Error;

/// A raw value does not follow the grammar of its style
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An embedded JSON object or array is not valid JSON
    #[error("Malformed JSON value '{raw}': {reason}")]
    MalformedJson { raw: String, reason: String },

    /// A tuple lacks items that have no default
    #[error("Expected {expected} tuple items, found {found}")]
    MissingTupleItems { expected: usize, found: usize },

    /// A tuple has more items than declared and extra items are not allowed
    #[error("Found {found} tuple items, at most {allowed} allowed")]
    UnexpectedTupleItems { allowed: usize, found: usize },

    /// A deep-object key is not of the form `name[property]`
    #[error("Malformed deep object key '{key}'")]
    MalformedSubscript { key: String },

    /// A delimited object has an odd number of key/value tokens
    #[error("Object value '{raw}' has an odd number of tokens ({count})")]
    UnbalancedObject { raw: String, count: usize },

    /// A delimited object entry is not of the form `key=value`
    #[error("Invalid object entry '{entry}', expected key=value")]
    InvalidAssignment { entry: String },
}
