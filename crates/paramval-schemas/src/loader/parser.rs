//! Document parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 Paramval Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Get the primary file extension for this format
    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

/// Parser turning OpenAPI / JSON Schema documents into JSON values
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a document file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse document content with explicit format
    ///
    /// `path` is only used for error context.
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, path),
            Format::Json => self.parse_json(content, path),
        }
    }

    /// Parse YAML content
    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        // Convert to JSON Value for consistent handling
        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    /// Parse JSON content
    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("api.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("api.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("api.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("api.txt")).is_err());
        assert!(Format::from_path(Path::new("api")).is_err());
    }

    #[test]
    fn test_parse_yaml_file() -> LoaderResult<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("openapi.yaml");
        fs::write(
            &path,
            r#"
openapi: 3.0.3
components:
  schemas:
    Id:
      type: integer
      minimum: 1
"#,
        )
        .unwrap();

        let document = SchemaParser::new().parse_file(&path)?;
        assert_eq!(document["components"]["schemas"]["Id"]["type"], "integer");
        assert_eq!(document["components"]["schemas"]["Id"]["minimum"], 1);
        Ok(())
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let parser = SchemaParser::new();
        let err = parser
            .parse_content("{not json", Format::Json, Path::new("broken.json"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::JsonParseError { .. }));
        assert_eq!(err.path().unwrap(), Path::new("broken.json"));
    }
}
