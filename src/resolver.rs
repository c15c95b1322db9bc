//! # External Schema Resolver
//!
//! Indexes tying schemas loaded from external files to candidate component
//! names and source paths, plus the guarded loader for files the bundler did
//! not touch. Every lookup that can match more than one candidate resolves
//! to "no answer": ambiguity always means the document is left unchanged.

use crate::bundle::SchemaParser;
use crate::fingerprint::fingerprint;
use crate::pointer::component_name_of;
use crate::refs::{base_name, resolve_relative, strip_fragment};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Keywords whose presence marks a record as a likely schema. Used as a
/// cheap gate so arbitrary metadata records are never fingerprinted or
/// matched against external candidates.
const LIKELY_SCHEMA_KEYS: &[&str] = &[
    "$ref",
    "additionalProperties",
    "allOf",
    "anyOf",
    "const",
    "discriminator",
    "enum",
    "format",
    "items",
    "not",
    "oneOf",
    "patternProperties",
    "properties",
    "required",
    "type",
];

/// Returns true when `value` is a record carrying at least one recognized
/// JSON-Schema / OpenAPI keyword.
pub(crate) fn is_likely_schema(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => LIKELY_SCHEMA_KEYS.iter().any(|key| map.contains_key(*key)),
        None => false,
    }
}

/// Outcome of matching a file reference against the known source paths.
pub(crate) enum PathMatch {
    /// Exactly one known path matches.
    Unique(String),
    /// Two or more known paths share the basename and none is singled out.
    Ambiguous,
    /// No known path carries this basename.
    Unknown,
}

/// Per-invocation indexes over external schemas. Holds copies of parsed file
/// contents; discarded when normalization completes.
#[derive(Default)]
pub(crate) struct ExternalResolver {
    names_by_fingerprint: HashMap<String, IndexSet<String>>,
    canonical_by_name: HashMap<String, Value>,
    schema_by_source_path: HashMap<String, Value>,
    source_paths_by_fingerprint: HashMap<String, IndexSet<String>>,
    source_paths_by_base_name: HashMap<String, IndexSet<String>>,
    component_name_by_source_path: IndexMap<String, String>,
    source_path_by_component_name: HashMap<String, String>,
    component_pointer_by_name: HashMap<String, String>,
    loading_source_paths: HashSet<String>,
}

impl ExternalResolver {
    /// Records `name` as a candidate component name for `schema`.
    /// Ignored unless `schema` is a likely schema record.
    pub(crate) fn add_external_name_candidate(&mut self, schema: &Value, name: &str) {
        if !is_likely_schema(schema) {
            return;
        }
        let fp = fingerprint(schema);
        self.canonical_by_name
            .entry(name.to_string())
            .or_insert_with(|| schema.clone());
        self.names_by_fingerprint
            .entry(fp)
            .or_default()
            .insert(name.to_string());
    }

    /// Records the bidirectional file ↔ schema association for `path`.
    /// Ignored unless `schema` is a likely schema record.
    pub(crate) fn register_external_source_path(&mut self, path: &str, schema: &Value) {
        if !is_likely_schema(schema) {
            return;
        }
        let fp = fingerprint(schema);
        self.schema_by_source_path
            .entry(path.to_string())
            .or_insert_with(|| schema.clone());
        self.source_paths_by_fingerprint
            .entry(fp)
            .or_default()
            .insert(path.to_string());
        self.source_paths_by_base_name
            .entry(base_name(path).to_ascii_lowercase())
            .or_default()
            .insert(path.to_string());
    }

    /// The candidate name for `schema`, when exactly one candidate shares its
    /// fingerprint.
    pub(crate) fn resolve_schema_candidate(&self, schema: &Value) -> Option<&str> {
        let names = self.names_by_fingerprint.get(&fingerprint(schema))?;
        if names.len() == 1 {
            names.first().map(String::as_str)
        } else {
            None
        }
    }

    /// The component name for `schema` against an index of already-hoisted
    /// components (fingerprint → names); undefined on zero or several matches.
    pub(crate) fn resolve_component_candidate(
        &self,
        schema: &Value,
        index: &HashMap<String, IndexSet<String>>,
    ) -> Option<String> {
        let names = index.get(&fingerprint(schema))?;
        if names.len() == 1 {
            names.first().cloned()
        } else {
            None
        }
    }

    /// The canonical schema recorded for a candidate name.
    pub(crate) fn canonical_schema(&self, name: &str) -> Option<&Value> {
        self.canonical_by_name.get(name)
    }

    /// Whether `name` is a known external candidate name.
    pub(crate) fn is_candidate_name(&self, name: &str) -> bool {
        self.canonical_by_name.contains_key(name)
    }

    /// The unique source path whose schema fingerprints equal `schema`'s.
    pub(crate) fn source_path_for_schema_value(&self, schema: &Value) -> Option<&str> {
        let paths = self.source_paths_by_fingerprint.get(&fingerprint(schema))?;
        if paths.len() == 1 {
            paths.first().map(String::as_str)
        } else {
            None
        }
    }

    /// The parsed schema recorded for `path`, if cached.
    pub(crate) fn schema_for_source_path(&self, path: &str) -> Option<&Value> {
        self.schema_by_source_path.get(path)
    }

    /// Matches `path_ref` against the known source paths: by unique basename
    /// first, then by unique `/<path_ref>` suffix among the basename
    /// candidates (leading `./` stripped, case-insensitive).
    pub(crate) fn match_source_path(&self, path_ref: &str) -> PathMatch {
        let file = base_name(strip_fragment(path_ref)).to_ascii_lowercase();
        let Some(candidates) = self.source_paths_by_base_name.get(&file) else {
            return PathMatch::Unknown;
        };
        if candidates.len() == 1 {
            if let Some(path) = candidates.first() {
                return PathMatch::Unique(path.clone());
            }
        }
        let needle = format!(
            "/{}",
            strip_fragment(path_ref)
                .trim_start_matches("./")
                .to_ascii_lowercase()
        );
        let mut matched = candidates
            .iter()
            .filter(|path| path.to_ascii_lowercase().ends_with(&needle));
        match (matched.next(), matched.next()) {
            (Some(path), None) => PathMatch::Unique(path.clone()),
            _ => PathMatch::Ambiguous,
        }
    }

    /// Convenience wrapper returning only the unique match.
    pub(crate) fn resolve_matching_source_path(&self, path_ref: &str) -> Option<String> {
        match self.match_source_path(path_ref) {
            PathMatch::Unique(path) => Some(path),
            _ => None,
        }
    }

    /// Resolves `path_ref` relative to the source file of the containing
    /// schema: the schema is tied to a file by unique fingerprint or, when it
    /// sits at a component root, by its assigned component name.
    pub(crate) fn resolve_source_path_from_schema_context(
        &self,
        path_ref: &str,
        schema: &Value,
        pointer: &str,
    ) -> Option<String> {
        let base = self
            .source_path_for_schema_value(schema)
            .map(str::to_string)
            .or_else(|| {
                let name = component_name_of(pointer)?;
                self.source_path_by_component_name.get(&name).cloned()
            })?;
        Some(resolve_relative(&base, strip_fragment(path_ref)))
    }

    /// Records the component name assigned to a source path (and back).
    pub(crate) fn assign_component_name(&mut self, path: &str, name: &str) {
        self.component_name_by_source_path
            .insert(path.to_string(), name.to_string());
        self.source_path_by_component_name
            .insert(name.to_string(), path.to_string());
    }

    /// The component name already assigned to `path`, if any.
    pub(crate) fn component_name_for_source_path(&self, path: &str) -> Option<&str> {
        self.component_name_by_source_path
            .get(path)
            .map(String::as_str)
    }

    /// Snapshot of all (component name, source path) pairs, in assignment
    /// order.
    pub(crate) fn component_source_pairs(&self) -> Vec<(String, String)> {
        self.component_name_by_source_path
            .iter()
            .map(|(path, name)| (name.clone(), path.clone()))
            .collect()
    }

    /// Records the component pointer a candidate name was registered under.
    pub(crate) fn record_component_pointer(&mut self, name: &str, pointer: &str) {
        self.component_pointer_by_name
            .insert(name.to_string(), pointer.to_string());
    }

    /// The component pointer previously registered for a candidate name.
    pub(crate) fn component_pointer_for(&self, name: &str) -> Option<&str> {
        self.component_pointer_by_name.get(name).map(String::as_str)
    }

    /// Loads (and caches) the schema file at `path` through the parser
    /// abstraction. Returns `None` on re-entry, on parse failure, and for
    /// files that do not hold a likely schema record; failures are swallowed.
    pub(crate) fn ensure_loaded(
        &mut self,
        path: &str,
        parser: &mut dyn SchemaParser,
    ) -> Option<Value> {
        if let Some(cached) = self.schema_by_source_path.get(path) {
            return Some(cached.clone());
        }
        if !self.loading_source_paths.insert(path.to_string()) {
            return None;
        }
        let parsed = parser.parse(path);
        self.loading_source_paths.remove(path);
        match parsed {
            Ok(value) if is_likely_schema(&value) => {
                let name = crate::naming::name_from_source_path(path);
                self.add_external_name_candidate(&value, &name);
                self.register_external_source_path(path, &value);
                Some(value)
            }
            Ok(_) => {
                debug!(path, "external file is not a schema record; skipping");
                None
            }
            Err(error) => {
                debug!(path, %error, "failed to parse external schema; skipping");
                None
            }
        }
    }
}
