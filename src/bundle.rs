//! # Bundler Abstraction
//!
//! The normalizer consumes the output of an external reference-resolving
//! bundler: one document tree plus the ordered list of resources the bundler
//! touched. [`Bundle`] carries that state; [`SchemaParser`] is the abstraction
//! through which previously-untouched files are parsed on demand.

use crate::error::{HoistError, HoistResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// A bundled OpenAPI document together with the bundler's load metadata.
///
/// The first entry of the loaded-path list is the root document; subsequent
/// entries are files the bundler resolved references into. When the list is
/// absent entirely, [`crate::normalize`] treats the bundle as opaque and does
/// not touch the document.
pub struct Bundle {
    /// The mutable document tree. Mutated in place by normalization.
    pub document: Value,
    loaded_paths: Option<Vec<String>>,
    loaded: HashMap<String, Value>,
}

impl Bundle {
    /// Creates a bundle without load metadata. Normalization will be a no-op.
    pub fn new(document: Value) -> Self {
        Self {
            document,
            loaded_paths: None,
            loaded: HashMap::new(),
        }
    }

    /// Creates a bundle with the ordered list of paths the bundler touched.
    pub fn with_loaded_paths(document: Value, loaded_paths: Vec<String>) -> Self {
        Self {
            document,
            loaded_paths: Some(loaded_paths),
            loaded: HashMap::new(),
        }
    }

    /// Records the already-parsed value for a path the bundler loaded.
    pub fn insert_loaded(&mut self, path: impl Into<String>, value: Value) {
        self.loaded.insert(path.into(), value);
    }

    /// The ordered list of loaded resources, if the bundler provided one.
    pub fn loaded_paths(&self) -> Option<&[String]> {
        self.loaded_paths.as_deref()
    }

    /// The already-parsed value for a given path, if any.
    pub fn get_loaded(&self, path: &str) -> Option<&Value> {
        self.loaded.get(path)
    }

    /// Consumes the bundle, returning the (possibly normalized) document.
    pub fn into_document(self) -> Value {
        self.document
    }
}

/// Parses a schema file into a raw document tree.
///
/// Implementations may fail; the normalizer swallows failures and leaves the
/// affected references unchanged.
pub trait SchemaParser {
    /// Parses and returns the document at `path`.
    fn parse(&mut self, path: &str) -> HoistResult<Value>;
}

/// File-system parser reading `.json` via `serde_json` and everything else
/// (`.yaml` / `.yml`) via `serde_yaml`.
#[derive(Default)]
pub struct FileParser {
    base_dir: Option<PathBuf>,
}

impl FileParser {
    /// Creates a parser resolving paths against the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser resolving relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl SchemaParser for FileParser {
    fn parse(&mut self, path: &str) -> HoistResult<Value> {
        let full = match &self.base_dir {
            Some(dir) => dir.join(path),
            None => PathBuf::from(path),
        };
        let text = std::fs::read_to_string(&full)?;
        if path.to_ascii_lowercase().ends_with(".json") {
            serde_json::from_str(&text).map_err(|e| {
                HoistError::Parse(format!("Failed to parse JSON schema '{}': {}", path, e))
            })
        } else {
            serde_yaml::from_str(&text).map_err(|e| {
                HoistError::Parse(format!("Failed to parse YAML schema '{}': {}", path, e))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_file_parser_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pet.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "type: object\nproperties:\n  id:\n    type: string").unwrap();

        let mut parser = FileParser::new();
        let value = parser.parse(path.to_str().unwrap()).unwrap();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["id"]["type"], "string");
    }

    #[test]
    fn test_file_parser_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        std::fs::write(&path, r#"{"type": "string"}"#).unwrap();

        let mut parser = FileParser::with_base_dir(dir.path());
        let value = parser.parse("id.json").unwrap();
        assert_eq!(value, json!({"type": "string"}));
    }

    #[test]
    fn test_file_parser_missing_file() {
        let mut parser = FileParser::new();
        let result = parser.parse("/nonexistent/schema.yaml");
        assert!(matches!(result, Err(HoistError::Io(_))));
    }

    #[test]
    fn test_file_parser_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json").unwrap();

        let mut parser = FileParser::with_base_dir(dir.path());
        let result = parser.parse("broken.json");
        assert!(matches!(result, Err(HoistError::Parse(_))));
    }

    #[test]
    fn test_bundle_accessors() {
        let mut bundle =
            Bundle::with_loaded_paths(json!({"openapi": "3.1.0"}), vec!["root.yaml".to_string()]);
        bundle.insert_loaded("root.yaml", json!({"openapi": "3.1.0"}));

        assert_eq!(bundle.loaded_paths().unwrap().len(), 1);
        assert!(bundle.get_loaded("root.yaml").is_some());
        assert!(bundle.get_loaded("other.yaml").is_none());
        assert_eq!(bundle.into_document()["openapi"], "3.1.0");
    }
}
