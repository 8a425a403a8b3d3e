//! Core types for parameter descriptors
//!
//! This module defines the fundamental enums used throughout the library
//! for describing where a parameter lives and how it is serialized.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Where a parameter is read from in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path template variable
    Path,
    /// Query string
    Query,
    /// Request header
    Header,
    /// Cookie
    Cookie,
    /// Form field of a url-encoded or multipart body
    Form,
}

impl ParameterLocation {
    /// Whether names in this location are compared case-sensitively
    ///
    /// Only header names are case-insensitive.
    pub fn is_case_sensitive(&self) -> bool {
        !matches!(self, ParameterLocation::Header)
    }

    /// Canonical form of a name for lookups in this location
    pub fn normalize_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.is_case_sensitive() || !name.chars().any(|c| c.is_uppercase()) {
            Cow::Borrowed(name)
        } else {
            Cow::Owned(name.to_lowercase())
        }
    }

    /// Whether two names denote the same parameter in this location
    pub fn names_match(&self, a: &str, b: &str) -> bool {
        if self.is_case_sensitive() {
            a == b
        } else {
            self.normalize_name(a) == self.normalize_name(b)
        }
    }

    /// Parse the OpenAPI `in` value
    pub fn from_openapi(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }

    /// Lowercase name of the location
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Form => "form",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire encoding of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterStyle {
    /// One raw string, delimited for arrays, tuples and objects
    Simple,
    /// One raw value per array item, all under the parameter name
    ExplodedArray,
    /// One raw value per tuple slot, all under the parameter name
    ExplodedTuple,
    /// One raw value per object property, named after the property
    ExplodedObject,
    /// One raw value per object property, named `param[property]`
    DeepObject,
}

impl fmt::Display for ParameterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterStyle::Simple => write!(f, "SIMPLE"),
            ParameterStyle::ExplodedArray => write!(f, "EXPLODED_ARRAY"),
            ParameterStyle::ExplodedTuple => write!(f, "EXPLODED_TUPLE"),
            ParameterStyle::ExplodedObject => write!(f, "EXPLODED_OBJECT"),
            ParameterStyle::DeepObject => write!(f, "DEEP_OBJECT"),
        }
    }
}
