//! # Component Naming
//!
//! Derives component names from source file paths and from JSON pointers,
//! and deduplicates them inside the shared `components.schemas` namespace.

use crate::pointer::decode_token;
use crate::refs::base_name;
use heck::ToPascalCase;
use indexmap::IndexSet;

/// Pointer tokens that never make good component names: structural keywords,
/// HTTP verbs, and container keys.
const IGNORED_POINTER_TOKENS: &[&str] = &[
    "allOf",
    "anyOf",
    "components",
    "content",
    "items",
    "oneOf",
    "paths",
    "get",
    "put",
    "post",
    "patch",
    "delete",
    "head",
    "trace",
    "options",
    "requestBody",
    "responses",
    "schema",
    "schemas",
];

/// Derives a component name from a source file path: the basename with its
/// last extension stripped, any character outside `[A-Za-z0-9._-]` replaced
/// by `-`.
pub(crate) fn name_from_source_path(path: &str) -> String {
    let base = base_name(path);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    };
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "Schema".to_string()
    } else {
        cleaned
    }
}

/// Derives a component name from a JSON pointer by scanning its tokens from
/// the last back to the first, skipping indices, path templates, media types,
/// and structural keywords.
pub(crate) fn name_from_pointer(pointer: &str) -> String {
    let frag = pointer.trim_start_matches('#');
    for token in frag.split('/').rev() {
        if token.is_empty() {
            continue;
        }
        let decoded = decode_token(token);
        if decoded.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if decoded.contains('/') || decoded.starts_with("application/") {
            continue;
        }
        if IGNORED_POINTER_TOKENS.contains(&decoded.as_str()) {
            continue;
        }
        return pascal_case(&decoded);
    }
    "Schema".to_string()
}

/// Normalizes an arbitrary token to PascalCase: trailing extension stripped,
/// non-alphanumerics treated as word separators.
pub(crate) fn pascal_case(raw: &str) -> String {
    let stem = match raw.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => raw,
    };
    let spaced: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let name = spaced.to_pascal_case();
    if name.is_empty() {
        "Schema".to_string()
    } else {
        name
    }
}

/// Picks a free name for `preferred` inside `used`, appending `_2`, `_3`, …
/// on collision, and records the chosen name in the set.
pub(crate) fn unique_name(preferred: &str, used: &mut IndexSet<String>) -> String {
    if used.insert(preferred.to_string()) {
        return preferred.to_string();
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", preferred, suffix);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}
