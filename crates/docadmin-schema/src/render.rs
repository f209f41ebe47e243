//! Editable field lists for the presentation layer
//!
//! Two paths produce [`FieldView`]s:
//! - [`render_fields`] when the collection has a schema
//! - [`present`] when it does not (top-level keys only)

use crate::document::{display_value, Document};
use crate::path::DottedPath;
use crate::schema::{capitalize, SchemaField, SchemaVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display descriptor handed to the presentation collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldView {
    /// Dotted field name, used as the form input name
    pub name: String,
    /// Display name
    pub label: String,
    /// Render-widget hint
    pub control: String,
    /// Optional type annotation from the schema
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Current value as text
    pub value: String,
}

/// Read the current value of a dotted field
///
/// Walks the document one segment at a time. A missing key yields an empty
/// string; the first non-object value met is returned as the leaf. When the
/// whole path lands on a nested object, that sub-document is returned.
#[must_use]
pub fn resolve(path: &DottedPath, document: &Document) -> Value {
    let mut current = document;
    for segment in path.iter() {
        match current.get(segment) {
            Some(Value::Object(child)) => current = child,
            Some(leaf) => return leaf.clone(),
            None => return Value::String(String::new()),
        }
    }
    Value::Object(current.clone())
}

fn resolve_flat(path: &DottedPath, document: &Document) -> Value {
    document
        .get(&path.to_string())
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Value shown for a field of a record that does not exist yet
#[must_use]
pub fn initial_value(field: &SchemaField, version: SchemaVersion) -> String {
    if version.uses_defaults() {
        field.default.clone().unwrap_or_default()
    } else {
        String::new()
    }
}

/// Combine schema fields with a document into display descriptors
///
/// `document` is `None` (or empty) for a record that is being created; in
/// that case values come from the schema defaults instead of the document.
#[must_use]
pub fn render_fields(
    fields: &[SchemaField],
    version: SchemaVersion,
    document: Option<&Document>,
) -> Vec<FieldView> {
    let document = document.filter(|d| !d.is_empty());
    fields
        .iter()
        .map(|field| {
            let value = match document {
                None => initial_value(field, version),
                Some(document) if version.resolves_nested() => {
                    display_value(&resolve(&field.name, document))
                }
                Some(document) => display_value(&resolve_flat(&field.name, document)),
            };
            FieldView {
                name: field.name.to_string(),
                label: field.label.clone(),
                control: field.control.clone(),
                field_type: field.field_type.clone(),
                value,
            }
        })
        .collect()
}

/// Present a schemaless document as one text field per top-level key
///
/// Values containing a newline get a `textarea` control, everything else
/// `text`. Nested objects are shown as JSON text.
#[must_use]
pub fn present(document: &Document) -> Vec<FieldView> {
    document
        .iter()
        .map(|(key, value)| {
            let value = display_value(value);
            let control = if value.contains('\n') { "textarea" } else { "text" };
            FieldView {
                name: key.clone(),
                label: capitalize(key),
                control: control.to_string(),
                field_type: None,
                value,
            }
        })
        .collect()
}
