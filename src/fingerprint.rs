//! # Structural Fingerprint
//!
//! Deterministic stringification of a schema: object keys sorted
//! lexicographically, arrays in order, scalars in compact JSON form. The
//! root-level `summary` and `description` are excluded so that two copies of
//! a schema differing only in doc strings fingerprint identically, while
//! nested doc strings stay significant (they distinguish semantically
//! different nested schemas).

use serde_json::Value;

/// Computes the structural fingerprint of `schema`.
pub(crate) fn fingerprint(schema: &Value) -> String {
    let mut out = String::new();
    write_canonical(schema, 0, &mut out);
    out
}

fn write_canonical(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            let mut first = true;
            for key in keys {
                if depth == 0 && matches!(key.as_str(), "summary" | "description") {
                    continue;
                }
                if !first {
                    out.push(',');
                }
                first = false;
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(child) = map.get(key) {
                    write_canonical(child, depth + 1, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (index, child) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(child, depth + 1, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
