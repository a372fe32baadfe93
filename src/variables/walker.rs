//! Walks a parsed capture path through a structural value.

use serde_json::Value;

/// Follows `path` from `root`.
///
/// Mapping values are indexed by key, sequence values by a non-negative
/// decimal index. A missing key, a bad or out-of-range index, or a scalar
/// reached before the path is exhausted all yield `None`; a type mismatch is
/// an ordinary miss, never a panic.
///
/// # Examples
///
/// ```
/// use restler::variables::walker::walk;
/// use serde_json::json;
///
/// let doc = json!({"data": {"items": [{"id": "42"}]}});
/// let path = ["data", "items", "0", "id"];
/// assert_eq!(walk(&doc, &path), Some(&json!("42")));
/// assert_eq!(walk(&doc, &["data", "items", "1"]), None);
/// ```
pub fn walk<'a, S: AsRef<str>>(root: &'a Value, path: &[S]) -> Option<&'a Value> {
    let mut current = root;

    for segment in path {
        let segment = segment.as_ref();
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(parse_index(segment)?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Strict decimal index: digits only, no sign, no whitespace.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Default scalar formatting for captured values.
///
/// Strings are taken verbatim, numbers and booleans use their JSON text,
/// `null` becomes the empty string, and mappings or sequences are rendered
/// as compact JSON.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
