//! # JSON-Pointer Utilities
//!
//! Token encoding per RFC 6901 (`~` ↔ `~0`, `/` ↔ `~1`), local `#/…`
//! resolution against a document root, and in-place replacement by pointer.
//! These helpers never touch external documents.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Escapes a token for use inside a JSON Pointer.
pub(crate) fn encode_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Decodes a JSON Pointer token, attempting URI-decoding first and falling
/// back to the raw (unescaped) token when the percent sequence is malformed.
pub(crate) fn decode_token(token: &str) -> String {
    let unescaped = token.replace("~1", "/").replace("~0", "~");
    match percent_decode_str(&unescaped).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => unescaped,
    }
}

/// Builds the component pointer `#/components/schemas/<Name>`.
pub(crate) fn component_pointer(name: &str) -> String {
    format!("#/components/schemas/{}", encode_token(name))
}

/// Returns true iff `pointer` is exactly `#/components/schemas/<one token>`.
pub(crate) fn is_component_schema_root(pointer: &str) -> bool {
    match pointer.strip_prefix("#/components/schemas/") {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}

/// Extracts the decoded component name from a component root pointer.
pub(crate) fn component_name_of(pointer: &str) -> Option<String> {
    if !is_component_schema_root(pointer) {
        return None;
    }
    pointer
        .strip_prefix("#/components/schemas/")
        .map(decode_token)
}

/// Resolves a local `#` / `#/…` pointer against `root`.
///
/// Records descend by key, arrays by decimal index. Returns `None` for
/// non-local pointers and missing paths.
pub(crate) fn resolve_local<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let frag = pointer.strip_prefix('#')?;
    if frag.is_empty() {
        return Some(root);
    }
    let path = frag.strip_prefix('/')?;
    let mut current = root;
    for token in path.split('/') {
        let key = decode_token(token);
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable variant of [`resolve_local`].
pub(crate) fn resolve_local_mut<'a>(root: &'a mut Value, pointer: &str) -> Option<&'a mut Value> {
    let frag = pointer.strip_prefix('#')?;
    if frag.is_empty() {
        return Some(root);
    }
    let path = frag.strip_prefix('/')?;
    let mut current = root;
    for token in path.split('/') {
        let key = decode_token(token);
        current = match current {
            Value::Object(map) => map.get_mut(&key)?,
            Value::Array(items) => items.get_mut(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replaces the value at `pointer` with `replacement`.
///
/// Returns false when the pointer does not resolve (e.g. a previously
/// collected site was detached by an earlier replacement).
pub(crate) fn replace_at(root: &mut Value, pointer: &str, replacement: Value) -> bool {
    match resolve_local_mut(root, pointer) {
        Some(slot) => {
            *slot = replacement;
            true
        }
        None => false,
    }
}
