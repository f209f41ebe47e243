//! Nested documents
//!
//! A [`Document`] is a JSON object whose leaves are scalars. Dotted field
//! names are turned into nested fragments with [`nest`], and fragments are
//! combined with [`merge`].

use crate::path::{DottedPath, PathError};
use serde_json::Value;

/// One stored record: string keys mapping to scalars or nested documents
pub type Document = serde_json::Map<String, Value>;

/// Build a nested fragment from a dotted field name
///
/// `a.b.c` with value `v` becomes `{a: {b: {c: v}}}`.
///
/// # Errors
/// Returns [`PathError`] if `name` is empty or deeper than
/// [`MAX_DEPTH`](crate::path::MAX_DEPTH).
pub fn nest(name: &str, value: impl Into<Value>) -> Result<Document, PathError> {
    let path: DottedPath = name.parse()?;
    Ok(nest_path(&path, value.into()))
}

/// Build a nested fragment from an already validated path
#[must_use]
pub fn nest_path(path: &DottedPath, value: Value) -> Document {
    let mut segments = path.iter().rev();
    let mut fragment = Document::new();
    if let Some(leaf) = segments.next() {
        fragment.insert(leaf.to_string(), value);
    }
    for segment in segments {
        let mut parent = Document::new();
        parent.insert(segment.to_string(), Value::Object(fragment));
        fragment = parent;
    }
    fragment
}

/// Recursive key-union merge
///
/// Keys present on one side only are carried over unchanged. When both sides
/// hold an object the merge recurses; in every other case the value from
/// `overlay` replaces the one in `base`.
#[must_use]
pub fn merge(mut base: Document, overlay: Document) -> Document {
    for (key, incoming) in overlay {
        let merged = match (base.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(merge(std::mem::take(existing), incoming))
            }
            (_, incoming) => incoming,
        };
        base.insert(key, merged);
    }
    base
}

/// Render a value as the text shown in an input control
///
/// Strings are shown verbatim, `null` as an empty string and everything else
/// as JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn nest_single_segment() {
        assert_eq!(nest("x", "1").unwrap(), doc(json!({"x": "1"})));
    }

    #[test]
    fn nest_two_segments() {
        assert_eq!(nest("a.b", "v").unwrap(), doc(json!({"a": {"b": "v"}})));
    }

    #[test]
    fn nest_three_segments() {
        assert_eq!(
            nest("a.b.c", "v").unwrap(),
            doc(json!({"a": {"b": {"c": "v"}}}))
        );
    }

    #[test]
    fn nest_depth_four_fails() {
        assert!(matches!(
            nest("a.b.c.d", "v"),
            Err(PathError::DepthExceeded { depth: 4, .. })
        ));
    }

    #[test]
    fn nest_empty_name_fails() {
        assert_eq!(nest("", "v"), Err(PathError::Empty));
    }

    #[test]
    fn merge_scalar_override() {
        let merged = merge(doc(json!({"x": 1})), doc(json!({"x": 2})));
        assert_eq!(merged, doc(json!({"x": 2})));
    }

    #[test]
    fn merge_nested_override() {
        let merged = merge(doc(json!({"x": {"y": 1}})), doc(json!({"x": {"y": 2}})));
        assert_eq!(merged, doc(json!({"x": {"y": 2}})));
    }

    #[test]
    fn merge_scalar_replaced_by_mapping() {
        let merged = merge(doc(json!({"x": 1})), doc(json!({"x": {"y": 2}})));
        assert_eq!(merged, doc(json!({"x": {"y": 2}})));
    }

    #[test]
    fn merge_mapping_replaced_by_scalar() {
        let merged = merge(doc(json!({"x": {"y": 2}})), doc(json!({"x": "flat"})));
        assert_eq!(merged, doc(json!({"x": "flat"})));
    }

    #[test]
    fn merge_recurses_into_siblings() {
        let merged = merge(
            doc(json!({"profile": {"name": "Ada", "address": {"city": "London"}}})),
            doc(json!({"profile": {"address": {"zip": "N1"}}, "age": "36"})),
        );
        assert_eq!(
            merged,
            doc(json!({
                "profile": {"name": "Ada", "address": {"city": "London", "zip": "N1"}},
                "age": "36"
            }))
        );
    }

    #[test]
    fn merge_keeps_base_key_order() {
        let merged = merge(
            doc(json!({"b": "1", "a": {"x": "1"}})),
            doc(json!({"a": {"y": "2"}, "c": "3"})),
        );
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn display_value_variants() {
        assert_eq!(display_value(&json!("text")), "text");
        assert_eq!(display_value(&Value::Null), "");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!({"a": "b"})), r#"{"a":"b"}"#);
    }
}
