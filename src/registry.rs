//! # Schema Registry
//!
//! Owns the `components.schemas` namespace of the document under
//! normalization: the set of names in use, idempotent registration of
//! hoisted schemas, and the final sweep replacing duplicated component
//! bodies with references.
//!
//! Identity note: the document is an unaliased tree, so "the same object"
//! is recovered through structural fingerprints. A fingerprint carried by
//! two or more components is ambiguous and never used for replacement.

use crate::fingerprint::fingerprint;
use crate::naming::unique_name;
use crate::pointer::{component_pointer, is_component_schema_root};
use crate::refs::{is_plain_ref_shape, ref_replacement};
use crate::walk::walk_schema_positions;
use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Registry over `doc.components.schemas`, created once per normalization.
pub(crate) struct SchemaRegistry {
    names: IndexSet<String>,
}

impl SchemaRegistry {
    /// Initializes `components.schemas` on `doc` (creating both levels if
    /// absent) and seeds the name set from its existing keys.
    ///
    /// Returns `None` when the document or an existing `components` /
    /// `schemas` entry is not a record.
    pub(crate) fn create(doc: &mut Value) -> Option<Self> {
        let schemas = ensure_schemas(doc)?;
        let names = schemas.keys().cloned().collect();
        Some(Self { names })
    }

    /// Whether `name` is currently in use under `components.schemas`.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Registers `schema` under `preferred` (or a `_2`/`_3`-suffixed variant
    /// on collision) and returns its component pointer.
    ///
    /// Registration is idempotent for the same schema: if the component at
    /// `preferred` already fingerprints equal, or exactly one existing
    /// component does, that component's pointer is returned instead of
    /// inserting a duplicate.
    pub(crate) fn register(
        &mut self,
        doc: &mut Value,
        schema: Value,
        preferred: &str,
    ) -> Option<String> {
        let schemas = ensure_schemas(doc)?;
        let fp = fingerprint(&schema);

        if let Some(existing) = schemas.get(preferred) {
            if fingerprint(existing) == fp {
                return Some(component_pointer(preferred));
            }
        }

        let mut equal: Option<String> = None;
        let mut ambiguous = false;
        for (name, value) in schemas.iter() {
            if fingerprint(value) == fp {
                if equal.is_some() {
                    ambiguous = true;
                    break;
                }
                equal = Some(name.clone());
            }
        }
        if !ambiguous {
            if let Some(name) = equal {
                return Some(component_pointer(&name));
            }
        }

        let name = unique_name(preferred, &mut self.names);
        schemas.insert(name.clone(), schema);
        Some(component_pointer(&name))
    }

    /// Final dedupe sweep: replaces every schema-position record whose
    /// fingerprint matches exactly one component with a reference to that
    /// component, preserving `summary` / `description`. Returns the number of
    /// sites rewritten.
    pub(crate) fn replace_hoisted_inlines(&self, doc: &mut Value) -> usize {
        let mut pointer_by_fp: HashMap<String, Option<String>> = HashMap::new();
        if let Some(schemas) = schemas_of(doc) {
            for (name, value) in schemas {
                pointer_by_fp
                    .entry(fingerprint(value))
                    .and_modify(|slot| *slot = None)
                    .or_insert_with(|| Some(component_pointer(name)));
            }
        }

        let mut replacements: Vec<(String, Value)> = Vec::new();
        walk_schema_positions(doc, &mut |value, pointer, in_schema| {
            if !in_schema || !value.is_object() || is_component_schema_root(pointer) {
                return;
            }
            if is_plain_ref_shape(value) {
                return;
            }
            let Some(Some(target)) = pointer_by_fp.get(&fingerprint(value)) else {
                return;
            };
            if pointer == target.as_str() {
                return;
            }
            replacements.push((pointer.to_string(), ref_replacement(value, target)));
        });

        let mut rewritten = 0;
        for (pointer, replacement) in replacements {
            if crate::pointer::replace_at(doc, &pointer, replacement) {
                rewritten += 1;
            }
        }
        rewritten
    }
}

fn ensure_schemas(doc: &mut Value) -> Option<&mut Map<String, Value>> {
    let root = doc.as_object_mut()?;
    let components = root
        .entry("components")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()?;
    components
        .entry("schemas")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

fn schemas_of(doc: &Value) -> Option<&Map<String, Value>> {
    doc.get("components")?.get("schemas")?.as_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_initializes_and_seeds() {
        let mut doc = json!({"openapi": "3.1.0"});
        let registry = SchemaRegistry::create(&mut doc).unwrap();
        assert_eq!(doc["components"]["schemas"], json!({}));
        assert!(!registry.contains("Pet"));

        let mut doc = json!({"components": {"schemas": {"Pet": {"type": "object"}}}});
        let registry = SchemaRegistry::create(&mut doc).unwrap();
        assert!(registry.contains("Pet"));
    }

    #[test]
    fn test_register_is_idempotent_for_equal_schemas() {
        let mut doc = json!({"openapi": "3.1.0"});
        let mut registry = SchemaRegistry::create(&mut doc).unwrap();

        let first = registry
            .register(&mut doc, json!({"type": "string"}), "Id")
            .unwrap();
        let second = registry
            .register(&mut doc, json!({"type": "string"}), "Id")
            .unwrap();
        assert_eq!(first, "#/components/schemas/Id");
        assert_eq!(first, second);
        assert_eq!(doc["components"]["schemas"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_register_reuses_unique_fingerprint_under_other_name() {
        let mut doc = json!({"components": {"schemas": {"Id": {"type": "string"}}}});
        let mut registry = SchemaRegistry::create(&mut doc).unwrap();

        let pointer = registry
            .register(&mut doc, json!({"type": "string"}), "Identifier")
            .unwrap();
        assert_eq!(pointer, "#/components/schemas/Id");
        assert_eq!(doc["components"]["schemas"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_register_suffixes_on_collision() {
        let mut doc = json!({"openapi": "3.1.0"});
        let mut registry = SchemaRegistry::create(&mut doc).unwrap();

        let first = registry
            .register(&mut doc, json!({"type": "string"}), "Shape")
            .unwrap();
        let second = registry
            .register(&mut doc, json!({"type": "integer"}), "Shape")
            .unwrap();
        assert_eq!(first, "#/components/schemas/Shape");
        assert_eq!(second, "#/components/schemas/Shape_2");
    }

    #[test]
    fn test_replace_hoisted_inlines() {
        let mut doc = json!({
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "description": "local copy",
                                            "properties": {"id": {"type": "string"}}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {"type": "object", "properties": {"id": {"type": "string"}}}
                }
            }
        });
        let registry = SchemaRegistry::create(&mut doc).unwrap();
        let rewritten = registry.replace_hoisted_inlines(&mut doc);
        assert_eq!(rewritten, 1);
        assert_eq!(
            doc["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]
                ["schema"],
            json!({"$ref": "#/components/schemas/Pet", "description": "local copy"})
        );
    }

    #[test]
    fn test_replace_hoisted_inlines_skips_ambiguous_fingerprints() {
        let mut doc = json!({
            "paths": {
                "/a": {"get": {"responses": {"200": {"content": {"application/json": {
                    "schema": {"type": "string"}
                }}}}}}
            },
            "components": {
                "schemas": {
                    "A": {"type": "string"},
                    "B": {"type": "string"}
                }
            }
        });
        let registry = SchemaRegistry::create(&mut doc).unwrap();
        let rewritten = registry.replace_hoisted_inlines(&mut doc);
        assert_eq!(rewritten, 0);
        assert_eq!(
            doc["paths"]["/a"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
            json!({"type": "string"})
        );
    }
}
