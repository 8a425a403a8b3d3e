//! JSON pointers (RFC 6901) and their synthetic URI form
//!
//! Every schema fragment is identified by the pointer of its location in the
//! root document. Normalized schemas refer to fragments through absolute URIs
//! in the [`SCHEMA_NAMESPACE`], one URI per pointer, so a compiled validator
//! can resolve them without knowing where the original document came from.
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::fmt;

/// Base URI of the internal namespace used for normalized references
pub const SCHEMA_NAMESPACE: &str = "app://schemas/root";

/// Characters escaped when a pointer segment becomes a URI path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// A parsed JSON pointer
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The pointer to the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer such as `/components/schemas/Pet`
    pub fn parse(pointer: &str) -> LoaderResult<Self> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let rest = pointer.strip_prefix('/').ok_or_else(|| {
            LoaderError::invalid_pointer(pointer, "pointer must start with '/' or be empty")
        })?;

        let segments = rest
            .split('/')
            .map(|raw| Self::unescape(raw).ok_or_else(|| {
                LoaderError::invalid_pointer(pointer, "invalid '~' escape sequence")
            }))
            .collect::<LoaderResult<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Parse the fragment of a local reference such as `#/definitions/Item`
    pub fn from_reference(reference: &str) -> LoaderResult<Self> {
        let fragment = reference.strip_prefix('#').ok_or_else(|| {
            LoaderError::invalid_pointer(reference, "local reference must start with '#'")
        })?;
        Self::parse(fragment)
    }

    /// Build a pointer from already-unescaped segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Return a new pointer with one more segment
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Unescaped segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this pointer addresses the document root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve the pointer inside a document
    pub fn query<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The `#`-prefixed local reference form
    pub fn to_reference(&self) -> String {
        format!("#{}", self)
    }

    /// The absolute URI of this pointer in the [`SCHEMA_NAMESPACE`]
    pub fn to_uri(&self) -> String {
        let mut uri = String::from(SCHEMA_NAMESPACE);
        for segment in &self.segments {
            uri.push('/');
            uri.extend(utf8_percent_encode(segment, SEGMENT));
        }
        uri
    }

    /// Recover a pointer from a URI produced by [`JsonPointer::to_uri`]
    ///
    /// Returns `None` for URIs outside the namespace.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let uri = uri.split('#').next().unwrap_or(uri);
        let rest = uri.strip_prefix(SCHEMA_NAMESPACE)?;
        if rest.is_empty() {
            return Some(Self::root());
        }
        let rest = rest.strip_prefix('/')?;
        let segments = rest
            .split('/')
            .map(|s| percent_decode_str(s).decode_utf8().map(|d| d.into_owned()).ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Self { segments })
    }

    /// Whether a reference string lives in the internal namespace
    pub fn is_namespaced(reference: &str) -> bool {
        reference.starts_with(SCHEMA_NAMESPACE)
    }

    fn unescape(segment: &str) -> Option<String> {
        let mut out = String::with_capacity(segment.len());
        let mut chars = segment.chars();
        while let Some(ch) = chars.next() {
            if ch == '~' {
                match chars.next() {
                    Some('0') => out.push('~'),
                    Some('1') => out.push('/'),
                    _ => return None,
                }
            } else {
                out.push(ch);
            }
        }
        Some(out)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display() {
        let pointer = JsonPointer::parse("/components/schemas/a~1b~0c").unwrap();
        assert_eq!(pointer.segments(), &["components", "schemas", "a/b~c"]);
        assert_eq!(pointer.to_string(), "/components/schemas/a~1b~0c");
        assert!(JsonPointer::parse("").unwrap().is_root());
    }

    #[test]
    fn test_invalid_pointers() {
        assert!(JsonPointer::parse("components").is_err());
        assert!(JsonPointer::parse("/bad~2escape").is_err());
        assert!(JsonPointer::from_reference("/no/hash").is_err());
    }

    #[test]
    fn test_query() {
        let document = json!({
            "definitions": {"User": {"type": "object"}},
            "items": [1, 2, 3]
        });

        let user = JsonPointer::from_reference("#/definitions/User").unwrap();
        assert_eq!(user.query(&document), Some(&json!({"type": "object"})));

        let second = JsonPointer::parse("/items/1").unwrap();
        assert_eq!(second.query(&document), Some(&json!(2)));

        assert!(JsonPointer::parse("/items/x").unwrap().query(&document).is_none());
        assert_eq!(JsonPointer::root().query(&document), Some(&document));
    }

    #[test]
    fn test_uri_form_is_invertible() {
        let pointer = JsonPointer::from_segments(["components", "schemas", "Pet Store/v1~x"]);
        let uri = pointer.to_uri();
        assert!(uri.starts_with(SCHEMA_NAMESPACE));
        assert!(!uri[SCHEMA_NAMESPACE.len()..].contains(' '));
        assert_eq!(JsonPointer::from_uri(&uri), Some(pointer));

        assert_eq!(JsonPointer::from_uri(SCHEMA_NAMESPACE), Some(JsonPointer::root()));
        assert_eq!(JsonPointer::from_uri("https://example.com/schema"), None);
    }
}
