//! Raw request data as seen by parameter processors
//!
//! The routing layer materializes every location of a request into named
//! raw strings. Values keep their arrival order, and a name may repeat.

use crate::types::ParameterLocation;
use std::collections::HashMap;

/// Per-location ordered multimap of raw parameter values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    values: HashMap<ParameterLocation, Vec<(String, String)>>,
    body_present: bool,
}

impl RequestParameters {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the query location from a raw query string
    ///
    /// Names and values are percent-decoded and `+` is read as a space.
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();
        params.extend_query_string(query);
        params
    }

    /// Append every pair of a raw query string to the query location
    pub fn extend_query_string(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.insert(ParameterLocation::Query, name, value);
        }
    }

    /// Append a raw value
    ///
    /// Header names are lowercased.
    pub fn insert(
        &mut self,
        location: ParameterLocation,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) {
        let name = location.normalize_name(name.as_ref()).into_owned();
        self.values
            .entry(location)
            .or_default()
            .push((name, value.into()));
    }

    /// Builder form of [`RequestParameters::insert`]
    pub fn with(
        mut self,
        location: ParameterLocation,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(location, name, value);
        self
    }

    /// Every raw value for a name, in arrival order
    pub fn get_all(&self, location: ParameterLocation, name: &str) -> Vec<&str> {
        let name = location.normalize_name(name);
        self.entries(location)
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .collect()
    }

    /// The first raw value for a name
    pub fn first(&self, location: ParameterLocation, name: &str) -> Option<&str> {
        let name = location.normalize_name(name);
        self.entries(location)
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Whether at least one value exists for a name
    pub fn contains(&self, location: ParameterLocation, name: &str) -> bool {
        self.first(location, name).is_some()
    }

    /// All `(name, value)` pairs of a location, in arrival order
    pub fn entries(&self, location: ParameterLocation) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .get(&location)
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Record whether the request carries a body
    pub fn set_body_present(&mut self, present: bool) {
        self.body_present = present;
    }

    /// Whether the request carries a body
    pub fn has_body(&self) -> bool {
        self.body_present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_decoding() {
        let params = RequestParameters::from_query_string("?color%5Br%5D=255&name=John+Doe&tag=a&tag=b");

        assert_eq!(params.first(ParameterLocation::Query, "color[r]"), Some("255"));
        assert_eq!(params.first(ParameterLocation::Query, "name"), Some("John Doe"));
        assert_eq!(params.get_all(ParameterLocation::Query, "tag"), vec!["a", "b"]);
        assert!(params.get_all(ParameterLocation::Path, "tag").is_empty());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let params = RequestParameters::new().with(ParameterLocation::Header, "X-Rate-Limit", "10");

        assert_eq!(params.first(ParameterLocation::Header, "x-rate-limit"), Some("10"));
        assert_eq!(params.first(ParameterLocation::Header, "X-RATE-LIMIT"), Some("10"));
        assert_eq!(
            params.entries(ParameterLocation::Header).collect::<Vec<_>>(),
            vec![("x-rate-limit", "10")]
        );
    }

    #[test]
    fn test_query_lookup_is_case_sensitive() {
        let params = RequestParameters::new().with(ParameterLocation::Query, "Sort", "asc");
        assert!(params.contains(ParameterLocation::Query, "Sort"));
        assert!(!params.contains(ParameterLocation::Query, "sort"));
    }

    #[test]
    fn test_body_flag() {
        let mut params = RequestParameters::new();
        assert!(!params.has_body());
        params.set_body_present(true);
        assert!(params.has_body());
    }
}
