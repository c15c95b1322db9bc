//! Collapses inline copies of external schemas into references, repeated to
//! fixpoint: each replacement changes ancestor shapes, which can unlock
//! further matches in the next traversal. A record already in pure reference
//! shape is never replaced again, which guarantees termination.

use crate::fingerprint::fingerprint;
use crate::pointer::{is_component_schema_root, replace_at, resolve_local};
use crate::refs::{is_plain_ref_shape, ref_replacement};
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;
use crate::walk::walk_schema_positions;
use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashMap;

pub(super) fn collapse_inline_externals(
    doc: &mut Value,
    registry: &mut SchemaRegistry,
    resolver: &mut ExternalResolver,
) {
    loop {
        let component_index = build_component_index(doc, resolver);

        let mut sites: Vec<(String, String)> = Vec::new();
        walk_schema_positions(doc, &mut |value, pointer, in_schema| {
            if !in_schema || !value.is_object() || is_component_schema_root(pointer) {
                return;
            }
            if is_plain_ref_shape(value) {
                return;
            }
            let name = resolver
                .resolve_schema_candidate(value)
                .map(str::to_string)
                .or_else(|| resolver.resolve_component_candidate(value, &component_index));
            if let Some(name) = name {
                sites.push((pointer.to_string(), name));
            }
        });

        let mut changed = 0;
        for (pointer, name) in sites {
            let component = match resolver.component_pointer_for(&name) {
                Some(existing) => existing.to_string(),
                None => {
                    let Some(canonical) = resolver.canonical_schema(&name).cloned() else {
                        continue;
                    };
                    let Some(registered) = registry.register(doc, canonical, &name) else {
                        continue;
                    };
                    resolver.record_component_pointer(&name, &registered);
                    registered
                }
            };
            // Re-read the site: an earlier replacement may have detached or
            // already rewritten it.
            let Some(current) = resolve_local(doc, &pointer) else {
                continue;
            };
            if !current.is_object() || is_plain_ref_shape(current) {
                continue;
            }
            let replacement = ref_replacement(current, &component);
            if replace_at(doc, &pointer, replacement) {
                changed += 1;
            }
        }

        if changed == 0 {
            break;
        }
    }
}

/// Index over already-hoisted components whose names are known external
/// candidates: fingerprint → component names.
fn build_component_index(
    doc: &Value,
    resolver: &ExternalResolver,
) -> HashMap<String, IndexSet<String>> {
    let mut index: HashMap<String, IndexSet<String>> = HashMap::new();
    let Some(schemas) = doc
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return index;
    };
    for (name, value) in schemas {
        if !resolver.is_candidate_name(name) {
            continue;
        }
        index
            .entry(fingerprint(value))
            .or_default()
            .insert(name.clone());
    }
    index
}
