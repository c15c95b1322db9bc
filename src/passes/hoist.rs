//! Hoists externals declared by the bundler: every loaded file whose schema
//! appears somewhere in the document in a schema position becomes a
//! component, named after its source file. Occurrences are left in place;
//! the inline-dedupe pass rewrites them.

use crate::pointer::{component_name_of, is_component_schema_root};
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;
use crate::walk::walk_schema_positions;
use indexmap::IndexSet;
use serde_json::Value;
use tracing::debug;

pub(super) fn hoist_declared_externals(
    doc: &mut Value,
    registry: &mut SchemaRegistry,
    resolver: &mut ExternalResolver,
) {
    let mut found: IndexSet<String> = IndexSet::new();
    walk_schema_positions(doc, &mut |value, pointer, in_schema| {
        if !in_schema || !value.is_object() || is_component_schema_root(pointer) {
            return;
        }
        if let Some(path) = resolver.source_path_for_schema_value(value) {
            found.insert(path.to_string());
        }
    });

    // Lexicographic order keeps component-name assignment deterministic.
    let mut paths: Vec<String> = found.into_iter().collect();
    paths.sort();

    for path in paths {
        if resolver.component_name_for_source_path(&path).is_some() {
            continue;
        }
        let Some(schema) = resolver.schema_for_source_path(&path).cloned() else {
            continue;
        };
        let preferred = crate::naming::name_from_source_path(&path);
        let Some(pointer) = registry.register(doc, schema.clone(), &preferred) else {
            continue;
        };
        let Some(name) = component_name_of(&pointer) else {
            continue;
        };
        resolver.assign_component_name(&path, &name);
        resolver.add_external_name_candidate(&schema, &name);
        resolver.record_component_pointer(&name, &pointer);
        debug!(%path, %name, "hoisted external schema");
    }
}
