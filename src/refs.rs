//! # Reference Classification
//!
//! Predicates and small rewriting helpers for `$ref` strings and
//! file-relative reference paths. References are classified without any
//! network or filesystem access.

use serde_json::{Map, Value};

/// Returns true when `s` starts with a URI scheme (`[A-Za-z][A-Za-z0-9+.-]*:`).
pub(crate) fn has_uri_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-')) {
            return false;
        }
    }
    false
}

/// The part of a reference before its `#<fragment>`, if any.
pub(crate) fn strip_fragment(s: &str) -> &str {
    match s.split_once('#') {
        Some((path, _)) => path,
        None => s,
    }
}

/// Tests whether a string refers to an external schema file.
///
/// True iff it carries no URI scheme, does not start with `#/`, and its path
/// part ends with `.yaml`, `.yml`, or `.json` (case-insensitive), optionally
/// followed by a `#<fragment>`.
pub(crate) fn is_external_file_ref(s: &str) -> bool {
    if has_uri_scheme(s) || s.starts_with("#/") {
        return false;
    }
    let path = strip_fragment(s);
    if path.is_empty() {
        return false;
    }
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml") || lower.ends_with(".json")
}

/// Returns true when `value` is already a pure reference record: a `$ref`
/// string plus, at most, `summary` and `description` siblings.
pub(crate) fn is_plain_ref_shape(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    if !map.get("$ref").map(Value::is_string).unwrap_or(false) {
        return false;
    }
    map.keys()
        .all(|k| matches!(k.as_str(), "$ref" | "summary" | "description"))
}

/// Builds the reference record replacing an inline schema, carrying over the
/// schema's own `summary` and `description` as siblings of `$ref`.
pub(crate) fn ref_replacement(original: &Value, target: &str) -> Value {
    let mut map = Map::new();
    map.insert("$ref".to_string(), Value::String(target.to_string()));
    if let Some(obj) = original.as_object() {
        for key in ["summary", "description"] {
            if let Some(v) = obj.get(key) {
                map.insert(key.to_string(), v.clone());
            }
        }
    }
    Value::Object(map)
}

/// The final path segment of a `/`-separated source path.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The directory part of a source path, without the trailing separator.
pub(crate) fn parent_dir(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Resolves `reference` against the directory of `base_path`, collapsing
/// `.` and `..` segments. Absolute references are only normalized.
pub(crate) fn resolve_relative(base_path: &str, reference: &str) -> String {
    let reference = reference.trim_start_matches("./");
    if reference.starts_with('/') {
        return normalize_segments(reference);
    }
    let dir = parent_dir(base_path);
    if dir.is_empty() {
        normalize_segments(reference)
    } else {
        normalize_segments(&format!("{}/{}", dir, reference))
    }
}

/// Collapses `.` and `..` path segments, keeping the lead separator intact.
fn normalize_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    let joined = out.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_uri_scheme() {
        assert!(has_uri_scheme("https://example.com/a.yaml"));
        assert!(has_uri_scheme("file:///a.yaml"));
        assert!(has_uri_scheme("a+b.c-d:rest"));
        assert!(!has_uri_scheme("./a.yaml"));
        assert!(!has_uri_scheme("dir/a.yaml"));
        assert!(!has_uri_scheme("#/components/schemas/Pet"));
        assert!(!has_uri_scheme("1abc:rest"));
    }

    #[test]
    fn test_is_external_file_ref() {
        assert!(is_external_file_ref("Pet.yaml"));
        assert!(is_external_file_ref("./Pet.YML"));
        assert!(is_external_file_ref("../models/pet.json#/allOf/0"));
        assert!(!is_external_file_ref("https://example.com/pet.yaml"));
        assert!(!is_external_file_ref("#/components/schemas/Pet"));
        assert!(!is_external_file_ref("Pet"));
        assert!(!is_external_file_ref("Pet.txt"));
        assert!(!is_external_file_ref("#fragment-only"));
    }

    #[test]
    fn test_is_plain_ref_shape() {
        assert!(is_plain_ref_shape(&json!({"$ref": "#/components/schemas/Pet"})));
        assert!(is_plain_ref_shape(&json!({
            "$ref": "#/components/schemas/Pet",
            "summary": "A pet",
            "description": "Something furry"
        })));
        assert!(!is_plain_ref_shape(&json!({"$ref": "#/x", "type": "object"})));
        assert!(!is_plain_ref_shape(&json!({"type": "object"})));
        assert!(!is_plain_ref_shape(&json!({"$ref": 7})));
        assert!(!is_plain_ref_shape(&json!("#/x")));
    }

    #[test]
    fn test_ref_replacement_preserves_docstrings() {
        let original = json!({
            "type": "object",
            "summary": "A pet",
            "description": "Something furry",
            "properties": {}
        });
        let replaced = ref_replacement(&original, "#/components/schemas/Pet");
        assert_eq!(
            replaced,
            json!({
                "$ref": "#/components/schemas/Pet",
                "summary": "A pet",
                "description": "Something furry"
            })
        );
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(base_name("specs/models/Pet.yaml"), "Pet.yaml");
        assert_eq!(base_name("Pet.yaml"), "Pet.yaml");
        assert_eq!(parent_dir("specs/models/Pet.yaml"), "specs/models");
        assert_eq!(parent_dir("Pet.yaml"), "");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_relative("specs/models/Pet.yaml", "./Id.yaml"),
            "specs/models/Id.yaml"
        );
        assert_eq!(
            resolve_relative("specs/models/Pet.yaml", "../common/Err.yaml"),
            "specs/common/Err.yaml"
        );
        assert_eq!(resolve_relative("Pet.yaml", "Id.yaml"), "Id.yaml");
        assert_eq!(
            resolve_relative("specs/Pet.yaml", "/abs/Id.yaml"),
            "/abs/Id.yaml"
        );
    }
}
