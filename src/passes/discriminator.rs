//! Rewrites `discriminator.mapping` values that name external schema files
//! into component pointers, loading and hoisting the mapped files as needed.
//! Runs to fixpoint: registering one mapped file can make another mapping
//! value resolvable.

use crate::bundle::SchemaParser;
use crate::naming::name_from_source_path;
use crate::pointer::{component_pointer, encode_token, replace_at, resolve_local};
use crate::refs::{is_external_file_ref, strip_fragment};
use crate::registry::SchemaRegistry;
use crate::resolver::ExternalResolver;
use crate::walk::walk_schema_positions;
use serde_json::Value;
use tracing::debug;

struct MappingSite {
    /// Pointer to the mapping value slot.
    slot: String,
    /// The raw mapping value.
    value: String,
    /// Pointer to the schema record holding the discriminator.
    schema: String,
}

pub(super) fn rewrite_discriminator_mappings(
    doc: &mut Value,
    registry: &mut SchemaRegistry,
    resolver: &mut ExternalResolver,
    parser: &mut dyn SchemaParser,
) {
    loop {
        let mut sites: Vec<MappingSite> = Vec::new();
        walk_schema_positions(doc, &mut |value, pointer, in_schema| {
            if !in_schema {
                return;
            }
            let Some(mapping) = value
                .get("discriminator")
                .and_then(|d| d.get("mapping"))
                .and_then(Value::as_object)
            else {
                return;
            };
            for (key, entry) in mapping {
                let Some(target) = entry.as_str() else { continue };
                if !is_external_file_ref(target) {
                    continue;
                }
                sites.push(MappingSite {
                    slot: format!(
                        "{}/discriminator/mapping/{}",
                        pointer,
                        encode_token(key)
                    ),
                    value: target.to_string(),
                    schema: pointer.to_string(),
                });
            }
        });

        let mut changed = 0;
        for site in sites {
            if site.value.starts_with("#/components/schemas/") {
                continue;
            }

            let mut source_path = resolver.resolve_matching_source_path(&site.value);
            if source_path.is_none() {
                if let Some(schema) = resolve_local(doc, &site.schema) {
                    source_path = resolver.resolve_source_path_from_schema_context(
                        &site.value,
                        schema,
                        &site.schema,
                    );
                }
            }

            let Some(path) = source_path else {
                // Last resort: a component hoisted earlier under the name the
                // mapped file would have received.
                let derived = name_from_source_path(strip_fragment(&site.value));
                if registry.contains(&derived)
                    && replace_at(doc, &site.slot, Value::String(component_pointer(&derived)))
                {
                    changed += 1;
                } else {
                    debug!(value = %site.value, "unresolved discriminator mapping left unchanged");
                }
                continue;
            };

            let Some(name) =
                super::ensure_component_for_path(doc, registry, resolver, parser, &path)
            else {
                continue;
            };
            if replace_at(doc, &site.slot, Value::String(component_pointer(&name))) {
                changed += 1;
            }
        }

        if changed == 0 {
            break;
        }
    }
}
