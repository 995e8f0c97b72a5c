//! Canonical textual form.
//!
//! Compact JSON with mapping keys sorted at every level. Floats holding an
//! exact integral value are written as integers, so `1` and `1.0` produce the
//! same text. Comparing canonical forms is the tolerant second tier of the
//! equivalence check.

use crate::payload::model::Payload;
use serde_json::{Number, Value};

/// Render a payload in canonical form
pub fn canonical_text(value: &Payload) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
    }
}

fn write_string(s: &str, out: &mut String) {
    // Serializing a str cannot fail; fall back to Debug quoting just in case.
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str(&format!("{:?}", s)),
    }
}

fn canonical_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if is_integral(f) => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_sorted_at_every_level() {
        let v = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        assert_eq!(
            canonical_text(&v),
            r#"{"a":[{"x":2,"y":1}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn test_integral_float_renders_as_integer() {
        assert_eq!(canonical_text(&json!(1.0)), "1");
        assert_eq!(canonical_text(&json!(-0.0)), "0");
        assert_eq!(canonical_text(&json!(1)), "1");
        assert_eq!(canonical_text(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(canonical_text(&json!("a\"b\n")), r#""a\"b\n""#);
    }

    #[test]
    fn test_sequence_order_is_preserved() {
        assert_ne!(canonical_text(&json!([1, 2])), canonical_text(&json!([2, 1])));
    }

    #[test]
    fn test_scalars() {
        assert_eq!(canonical_text(&json!(null)), "null");
        assert_eq!(canonical_text(&json!(true)), "true");
        assert_eq!(canonical_text(&json!({})), "{}");
        assert_eq!(canonical_text(&json!([])), "[]");
    }
}
