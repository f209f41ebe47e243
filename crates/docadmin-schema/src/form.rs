//! Flat form input and its expansion into nested documents

use crate::document::{display_value, merge, nest, Document};
use crate::path::{DottedPath, PathError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw submitted input: dotted field name → string value
///
/// Insertion order is kept because expansion folds left to right. Inserting
/// an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatForm(IndexMap<String, String>);

impl FlatForm {
    /// Create empty form
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get a field value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if form has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for FlatForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for FlatForm {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Form keys that are never persisted as document fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedKeys {
    /// Record identifier key
    pub id_key: String,
    /// Forgery-protection token key
    pub token_key: String,
}

impl ReservedKeys {
    /// Check whether `key` is reserved
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        key == self.id_key || key == self.token_key
    }
}

impl Default for ReservedKeys {
    fn default() -> Self {
        Self {
            id_key: "_id".to_string(),
            token_key: "csrf_token".to_string(),
        }
    }
}

/// Errors while expanding a flat form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    /// A submitted key is not a valid field path
    #[error("invalid form field '{key}': {source}")]
    Field {
        key: String,
        #[source]
        source: PathError,
    },
}

/// Turns flat form submissions into nested documents
#[derive(Debug, Clone, Default)]
pub struct FormExpander {
    reserved: ReservedKeys,
}

impl FormExpander {
    /// Create expander stripping the given reserved keys
    #[inline]
    #[must_use]
    pub fn new(reserved: ReservedKeys) -> Self {
        Self { reserved }
    }

    /// Expand a submission against the prior stored document
    ///
    /// Every key of the form is nested and merged left to right. Top-level
    /// keys of `prior` that the submission does not mention are written as
    /// empty strings. Reserved keys never appear in the result.
    ///
    /// # Errors
    /// Returns [`ExpandError::Field`] for the first key that is not a valid
    /// dotted path; nothing is produced in that case.
    pub fn expand(&self, form: &FlatForm, prior: Option<&Document>) -> Result<Document, ExpandError> {
        let mut document = Document::new();
        for (key, value) in form.iter() {
            if self.reserved.contains(key.trim()) {
                continue;
            }
            let fragment = nest(key, value).map_err(|source| ExpandError::Field {
                key: key.to_string(),
                source,
            })?;
            document = merge(document, fragment);
        }

        if let Some(prior) = prior {
            for key in prior.keys() {
                if !document.contains_key(key) {
                    document.insert(key.clone(), Value::String(String::new()));
                }
            }
        }

        document.retain(|key, _| !self.reserved.contains(key));
        Ok(document)
    }
}

/// Flatten a nested document into dotted keys
///
/// Inverse of [`FormExpander::expand`] for documents of depth ≤ 3. Leaves are
/// rendered with [`display_value`]; empty nested objects produce no keys.
///
/// # Errors
/// Returns [`PathError`] if the document is nested deeper than
/// [`MAX_DEPTH`](crate::path::MAX_DEPTH) or has an empty key.
pub fn flatten(document: &Document) -> Result<FlatForm, PathError> {
    let mut form = FlatForm::new();
    for (key, value) in document {
        flatten_into(&mut form, DottedPath::single(key.clone())?, value)?;
    }
    Ok(form)
}

fn flatten_into(form: &mut FlatForm, path: DottedPath, value: &Value) -> Result<(), PathError> {
    match value {
        Value::Object(children) => {
            for (key, child) in children {
                flatten_into(form, path.child(key.clone())?, child)?;
            }
        }
        leaf => form.insert(path.to_string(), display_value(leaf)),
    }
    Ok(())
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
    fn expand_builds_nested_document() {
        let form: FlatForm = [
            ("profile.name", "Ada"),
            ("profile.address.city", "London"),
            ("age", "36"),
        ]
        .into_iter()
        .collect();

        let document = FormExpander::default().expand(&form, None).unwrap();
        assert_eq!(
            document,
            doc(json!({
                "profile": {"name": "Ada", "address": {"city": "London"}},
                "age": "36"
            }))
        );
    }

    #[test]
    fn expand_clears_missing_prior_fields() {
        let prior = doc(json!({"a": "old", "b": "keep"}));
        let form: FlatForm = [("b", "keep")].into_iter().collect();

        let document = FormExpander::default().expand(&form, Some(&prior)).unwrap();
        assert_eq!(document, doc(json!({"a": "", "b": "keep"})));
    }

    #[test]
    fn expand_clears_nested_prior_field_at_top_level() {
        let prior = doc(json!({"profile": {"name": "Ada"}, "age": "36"}));
        let form: FlatForm = [("age", "37")].into_iter().collect();

        let document = FormExpander::default().expand(&form, Some(&prior)).unwrap();
        assert_eq!(document, doc(json!({"age": "37", "profile": ""})));
    }

    #[test]
    fn expand_strips_reserved_keys() {
        let prior = doc(json!({"_id": "abc", "title": "old"}));
        let form: FlatForm = [("_id", "abc"), ("title", "new"), ("csrf_token", "t0k3n")]
            .into_iter()
            .collect();

        let document = FormExpander::default().expand(&form, Some(&prior)).unwrap();
        assert_eq!(document, doc(json!({"title": "new"})));
    }

    #[test]
    fn expand_strips_custom_reserved_keys() {
        let expander = FormExpander::new(ReservedKeys {
            id_key: "id".to_string(),
            token_key: "authenticity".to_string(),
        });
        let form: FlatForm = [("id", "1"), ("authenticity", "x"), ("_id", "kept")]
            .into_iter()
            .collect();

        let document = expander.expand(&form, None).unwrap();
        assert_eq!(document, doc(json!({"_id": "kept"})));
    }

    #[test]
    fn expand_depth_exceeded_aborts() {
        let form: FlatForm = [("ok", "1"), ("a.b.c.d", "2")].into_iter().collect();

        let err = FormExpander::default().expand(&form, None).unwrap_err();
        assert!(matches!(
            err,
            ExpandError::Field {
                ref key,
                source: PathError::DepthExceeded { depth: 4, .. },
            } if key == "a.b.c.d"
        ));
    }

    #[test]
    fn expand_later_keys_win_conflicts() {
        let form: FlatForm = [("a", "flat"), ("a.b", "nested")].into_iter().collect();
        let document = FormExpander::default().expand(&form, None).unwrap();
        assert_eq!(document, doc(json!({"a": {"b": "nested"}})));

        let form: FlatForm = [("a.b", "nested"), ("a", "flat")].into_iter().collect();
        let document = FormExpander::default().expand(&form, None).unwrap();
        assert_eq!(document, doc(json!({"a": "flat"})));
    }

    #[test]
    fn flat_form_duplicate_insert_replaces_in_place() {
        let mut form = FlatForm::new();
        form.insert("a", "1");
        form.insert("b", "2");
        form.insert("a", "3");

        let pairs: Vec<_> = form.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn flat_form_deserializes_from_json_object() {
        let form: FlatForm = serde_json::from_str(r#"{"a.b": "1", "c": "2"}"#).unwrap();
        assert_eq!(form.get("a.b"), Some("1"));
        assert_eq!(form.len(), 2);
    }

    #[test]
    fn flatten_produces_dotted_keys() {
        let document = doc(json!({
            "profile": {"name": "Ada", "address": {"city": "London"}},
            "age": 36,
            "tags": ["a", "b"]
        }));

        let form = flatten(&document).unwrap();
        let pairs: Vec<_> = form.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("profile.name", "Ada"),
                ("profile.address.city", "London"),
                ("age", "36"),
                ("tags", r#"["a","b"]"#),
            ]
        );
    }

    #[test]
    fn flatten_rejects_deep_documents() {
        let document = doc(json!({"a": {"b": {"c": {"d": "deep"}}}}));
        assert!(matches!(
            flatten(&document),
            Err(PathError::DepthExceeded { depth: 4, .. })
        ));
    }
}
