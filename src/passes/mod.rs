//! # Rewrite Passes
//!
//! The normalization pipeline: hoist declared externals, rewrite local deep
//! refs, collapse inline duplicates to fixpoint, rewrite discriminator
//! mappings and reapply source templates (twice end-to-end, since loading a
//! file during mapping can expose further templates and vice versa), then a
//! final dedupe sweep.
//!
//! Every pass computes its decisions on an immutable snapshot of the
//! document and applies them afterwards through pointer replacement, so no
//! pass observes its own partial writes.

mod discriminator;
mod hoist;
mod inline;
mod local_refs;
mod template;

use crate::bundle::{Bundle, SchemaParser};
use crate::naming::name_from_source_path;
use crate::pointer::component_name_of;
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;
use serde_json::Value;
use tracing::debug;

/// Runs the full pipeline over the bundle. No-op unless the document is
/// recognizably OpenAPI 3.x and the bundler provided its loaded-path list.
pub(crate) fn run(bundle: &mut Bundle, parser: &mut dyn SchemaParser) {
    if !is_openapi_3x(&bundle.document) {
        debug!("document is not OpenAPI 3.x; skipping normalization");
        return;
    }
    let Some(paths) = bundle.loaded_paths().map(<[String]>::to_vec) else {
        debug!("bundle carries no loaded-path metadata; skipping normalization");
        return;
    };

    let mut resolver = ExternalResolver::default();
    // The first loaded path is the root document; the rest are externals.
    for path in paths.iter().skip(1) {
        let value = match bundle.get_loaded(path) {
            Some(value) => Some(value.clone()),
            None => parser.parse(path).ok(),
        };
        let Some(value) = value else { continue };
        resolver.add_external_name_candidate(&value, &name_from_source_path(path));
        resolver.register_external_source_path(path, &value);
    }

    let doc = &mut bundle.document;
    let Some(mut registry) = SchemaRegistry::create(doc) else {
        return;
    };

    hoist::hoist_declared_externals(doc, &mut registry, &mut resolver);
    local_refs::rewrite_local_refs(doc, &mut registry, &mut resolver);
    inline::collapse_inline_externals(doc, &mut registry, &mut resolver);
    for _ in 0..2 {
        discriminator::rewrite_discriminator_mappings(doc, &mut registry, &mut resolver, parser);
        template::reapply_source_templates(doc, &mut registry, &mut resolver, parser);
    }
    let rewritten = registry.replace_hoisted_inlines(doc);
    debug!(rewritten, "final dedupe sweep complete");
}

fn is_openapi_3x(doc: &Value) -> bool {
    doc.get("openapi")
        .and_then(Value::as_str)
        .map(|v| v.starts_with("3."))
        .unwrap_or(false)
}

/// Ensures the file at `path` is loaded and registered as a component,
/// returning its component name. Reuses an existing assignment when one
/// exists; otherwise registers under a name derived from the source path.
pub(super) fn ensure_component_for_path(
    doc: &mut Value,
    registry: &mut SchemaRegistry,
    resolver: &mut ExternalResolver,
    parser: &mut dyn SchemaParser,
    path: &str,
) -> Option<String> {
    if let Some(name) = resolver.component_name_for_source_path(path) {
        return Some(name.to_string());
    }
    let schema = resolver.ensure_loaded(path, parser)?;
    let preferred = name_from_source_path(path);
    let pointer = registry.register(doc, schema.clone(), &preferred)?;
    let name = component_name_of(&pointer)?;
    resolver.assign_component_name(path, &name);
    resolver.add_external_name_candidate(&schema, &name);
    resolver.record_component_pointer(&name, &pointer);
    Some(name)
}
