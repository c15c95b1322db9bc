//! # Schema-Context Walker
//!
//! Pre-order traversal of a document tree that tracks, per visited node,
//! whether the node sits in a *schema position*: a location reachable only
//! through one of the JSON-Schema keywords that take a schema as child. The
//! rewrite passes use this flag so they only ever touch schema-shaped values
//! and never payloads under `example` / `examples` that happen to look like
//! schemas.

use crate::pointer::encode_token;
use serde_json::Value;

/// Keys whose children are schemas. Entering any of them flips the context
/// flag to true; once true it stays true for all descendants.
pub(crate) const SCHEMA_CONTEXT_KEYS: &[&str] = &[
    "$defs",
    "additionalProperties",
    "allOf",
    "anyOf",
    "contains",
    "definitions",
    "dependentSchemas",
    "else",
    "if",
    "items",
    "not",
    "oneOf",
    "patternProperties",
    "prefixItems",
    "properties",
    "propertyNames",
    "schema",
    "schemas",
    "then",
    "unevaluatedItems",
    "unevaluatedProperties",
];

/// Subtrees the walker never descends into. Example payloads and literal
/// value positions must survive normalization byte-for-byte.
const OPAQUE_KEYS: &[&str] = &["example", "examples", "default", "enum"];

/// Walks `root`, invoking `visit(value, pointer, in_schema_context)` on every
/// record and array before descending into it. Pointer tokens are
/// JSON-Pointer encoded; array indices are decimal.
pub(crate) fn walk_schema_positions<F>(root: &Value, visit: &mut F)
where
    F: FnMut(&Value, &str, bool),
{
    walk_inner(root, "#", false, visit);
}

fn walk_inner<F>(value: &Value, pointer: &str, in_schema: bool, visit: &mut F)
where
    F: FnMut(&Value, &str, bool),
{
    match value {
        Value::Object(map) => {
            visit(value, pointer, in_schema);
            for (key, child) in map {
                if OPAQUE_KEYS.contains(&key.as_str()) {
                    continue;
                }
                let child_in = in_schema || SCHEMA_CONTEXT_KEYS.contains(&key.as_str());
                let child_pointer = format!("{}/{}", pointer, encode_token(key));
                walk_inner(child, &child_pointer, child_in, visit);
            }
        }
        Value::Array(items) => {
            visit(value, pointer, in_schema);
            for (index, child) in items.iter().enumerate() {
                let child_pointer = format!("{}/{}", pointer, index);
                walk_inner(child, &child_pointer, in_schema, visit);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn contexts(doc: &Value) -> HashMap<String, bool> {
        let mut seen = HashMap::new();
        walk_schema_positions(doc, &mut |_, pointer, in_schema| {
            seen.insert(pointer.to_string(), in_schema);
        });
        seen
    }

    #[test]
    fn test_schema_context_through_media_type() {
        let doc = json!({
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": {"type": "object", "properties": {"id": {}}}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });
        let seen = contexts(&doc);
        let media = "#/paths/~1pets/get/responses/200/content/application~1json";
        assert_eq!(seen[media], false);
        assert_eq!(seen[&format!("{}/schema", media)], true);
        // Context sticks once entered, even through non-schema keys.
        assert_eq!(seen[&format!("{}/schema/properties/id", media)], true);
    }

    #[test]
    fn test_example_subtrees_are_opaque() {
        let doc = json!({
            "content": {
                "application/json": {
                    "schema": {"type": "object"},
                    "example": {"looks": {"like": {"type": "object"}}}
                }
            }
        });
        let seen = contexts(&doc);
        assert!(seen.contains_key("#/content/application~1json/schema"));
        assert!(!seen.keys().any(|p| p.contains("/example")));
    }

    #[test]
    fn test_components_schemas_are_schema_context() {
        let doc = json!({
            "components": {"schemas": {"Pet": {"type": "object"}}},
            "x-doc-refs": [{"$ref": "./docs/auth.md"}]
        });
        let seen = contexts(&doc);
        assert_eq!(seen["#/components/schemas/Pet"], true);
        assert_eq!(seen["#/components"], false);
        assert_eq!(seen["#/x-doc-refs"], false);
        assert_eq!(seen["#/x-doc-refs/0"], false);
    }

    #[test]
    fn test_array_indices_inherit_context() {
        let doc = json!({"schema": {"allOf": [{"type": "string"}]}});
        let seen = contexts(&doc);
        assert_eq!(seen["#/schema/allOf"], true);
        assert_eq!(seen["#/schema/allOf/0"], true);
    }
}
