//! Rewrites local deep references in schema positions: any `$ref` of the
//! form `#/…` that is not already a component pointer is resolved against
//! the document, its target hoisted into `components.schemas`, and the
//! reference repointed there. The target keeps its original location; the
//! final dedupe sweep collapses it.

use crate::naming::name_from_pointer;
use crate::pointer::{component_name_of, replace_at, resolve_local};
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;
use crate::walk::walk_schema_positions;
use serde_json::Value;
use std::collections::HashMap;

pub(super) fn rewrite_local_refs(
    doc: &mut Value,
    registry: &mut SchemaRegistry,
    resolver: &mut ExternalResolver,
) {
    let mut sites: Vec<(String, String)> = Vec::new();
    walk_schema_positions(doc, &mut |value, pointer, in_schema| {
        if !in_schema {
            return;
        }
        let Some(ref_str) = value.get("$ref").and_then(Value::as_str) else {
            return;
        };
        if !ref_str.starts_with("#/") || ref_str.starts_with("#/components/schemas/") {
            return;
        }
        sites.push((pointer.to_string(), ref_str.to_string()));
    });

    // One component per distinct target pointer: a target is the same
    // schema no matter how many references reach it.
    let mut component_by_target: HashMap<String, String> = HashMap::new();

    for (holder, ref_str) in sites {
        let component = match component_by_target.get(&ref_str) {
            Some(pointer) => pointer.clone(),
            None => {
                let Some(target) = resolve_local(doc, &ref_str) else {
                    continue;
                };
                if !target.is_object() {
                    continue;
                }
                let candidate = resolver.resolve_schema_candidate(target).map(str::to_string);
                let preferred =
                    candidate.clone().unwrap_or_else(|| name_from_pointer(&ref_str));
                let already = candidate
                    .as_deref()
                    .and_then(|name| resolver.component_pointer_for(name))
                    .map(str::to_string);
                let pointer = match already {
                    Some(pointer) => pointer,
                    None => {
                        let target = target.clone();
                        let Some(pointer) = registry.register(doc, target, &preferred) else {
                            continue;
                        };
                        if let Some(name) = component_name_of(&pointer) {
                            resolver.record_component_pointer(&name, &pointer);
                        }
                        pointer
                    }
                };
                component_by_target.insert(ref_str.clone(), pointer.clone());
                pointer
            }
        };
        replace_at(doc, &format!("{}/$ref", holder), Value::String(component));
    }
}
