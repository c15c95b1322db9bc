//! Source-template reconstruction: for every component tied to a source
//! file, walks the source file and the bundled component in parallel and
//! restores `$ref`-based composition the bundler flattened. Wherever the
//! source holds a reference to an external file, the corresponding bundled
//! node becomes a component pointer; non-matching shapes keep the bundled
//! value. Arrays recurse positionally over the common prefix.

use crate::bundle::SchemaParser;
use crate::pointer::{component_pointer, encode_token, replace_at, resolve_local};
use crate::refs::{is_external_file_ref, ref_replacement, resolve_relative, strip_fragment};
use crate::registry::SchemaRegistry;
use crate::resolver::{ExternalResolver, PathMatch};
use serde_json::Value;

pub(super) fn reapply_source_templates(
    doc: &mut Value,
    registry: &mut SchemaRegistry,
    resolver: &mut ExternalResolver,
    parser: &mut dyn SchemaParser,
) {
    for (name, path) in resolver.component_source_pairs() {
        let Some(source) = resolver.schema_for_source_path(&path).cloned() else {
            continue;
        };
        let root = component_pointer(&name);
        let Some(bundled) = resolve_local(doc, &root).cloned() else {
            continue;
        };

        let mut sites: Vec<(String, String)> = Vec::new();
        collect_template_refs(&source, &bundled, root, &mut sites);

        for (pointer, external_ref) in sites {
            let target_path = match resolver.match_source_path(&external_ref) {
                PathMatch::Unique(found) => found,
                PathMatch::Ambiguous => continue,
                PathMatch::Unknown => resolve_relative(&path, strip_fragment(&external_ref)),
            };
            let Some(target_name) =
                super::ensure_component_for_path(doc, registry, resolver, parser, &target_path)
            else {
                continue;
            };
            let Some(current) = resolve_local(doc, &pointer) else {
                continue;
            };
            let replacement = ref_replacement(current, &component_pointer(&target_name));
            if *current == replacement {
                continue;
            }
            replace_at(doc, &pointer, replacement);
        }
    }
}

/// Walks `source` and `bundled` in parallel, recording every bundled-side
/// pointer whose source counterpart is a record referencing an external
/// file. Does not descend below a recorded site.
fn collect_template_refs(
    source: &Value,
    bundled: &Value,
    pointer: String,
    sites: &mut Vec<(String, String)>,
) {
    match (source, bundled) {
        (Value::Object(source_map), Value::Object(bundled_map)) => {
            if let Some(ref_str) = source_map.get("$ref").and_then(Value::as_str) {
                if is_external_file_ref(ref_str) {
                    sites.push((pointer, ref_str.to_string()));
                    return;
                }
            }
            for (key, source_child) in source_map {
                if let Some(bundled_child) = bundled_map.get(key) {
                    collect_template_refs(
                        source_child,
                        bundled_child,
                        format!("{}/{}", pointer, encode_token(key)),
                        sites,
                    );
                }
            }
        }
        (Value::Array(source_items), Value::Array(bundled_items)) => {
            // Positional recursion over the common prefix; trailing bundled
            // elements stay untouched.
            for (index, (source_child, bundled_child)) in
                source_items.iter().zip(bundled_items.iter()).enumerate()
            {
                collect_template_refs(
                    source_child,
                    bundled_child,
                    format!("{}/{}", pointer, index),
                    sites,
                );
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_template_refs_parallel_walk() {
        let source = json!({
            "allOf": [
                {"$ref": "./PetBase.yaml#/allOf/0"},
                {"type": "object", "properties": {"id": {"$ref": "./Id.yaml"}}}
            ]
        });
        let bundled = json!({
            "allOf": [
                {"type": "object", "properties": {"category": {"type": "string"}}},
                {"type": "object", "properties": {"id": {"type": "string"}}}
            ]
        });
        let mut sites = Vec::new();
        collect_template_refs(&source, &bundled, "#/components/schemas/Pet".into(), &mut sites);
        assert_eq!(
            sites,
            vec![
                (
                    "#/components/schemas/Pet/allOf/0".to_string(),
                    "./PetBase.yaml#/allOf/0".to_string()
                ),
                (
                    "#/components/schemas/Pet/allOf/1/properties/id".to_string(),
                    "./Id.yaml".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_collect_template_refs_mismatched_shapes() {
        let source = json!({"items": [{"$ref": "./A.yaml"}, {"$ref": "./B.yaml"}]});
        let bundled = json!({"items": [{"type": "string"}]});
        let mut sites = Vec::new();
        collect_template_refs(&source, &bundled, "#".into(), &mut sites);
        // Only the common prefix is visited.
        assert_eq!(sites, vec![("#/items/0".to_string(), "./A.yaml".to_string())]);

        let mut sites = Vec::new();
        collect_template_refs(&json!({"a": 1}), &json!([1]), "#".into(), &mut sites);
        assert!(sites.is_empty());
    }
}
