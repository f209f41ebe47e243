//! Docadmin schema engine
//!
//! Schema-driven field transformation for document admin panels.
//!
//! # Core Concepts
//!
//! - [`DottedPath`]: field name with `.` separators, at most three segments deep
//! - [`parse_schema`]: schema text → ordered [`SchemaField`]s
//! - [`nest`] / [`merge`]: dotted names → nested [`Document`] fragments
//! - [`FormExpander`]: flat form submission → nested document, clearing
//!   fields the submission no longer mentions
//! - [`render_fields`] / [`present`]: document → editable [`FieldView`]s
//!
//! # Example
//!
//! ```rust
//! use docadmin_schema::{parse_schema, render_fields, FlatForm, FormExpander, SchemaVersion};
//!
//! let fields = parse_schema("profile.name:text:Full Name\nage:number", SchemaVersion::V3).unwrap();
//!
//! let form: FlatForm = [("profile.name", "Ada"), ("age", "36")].into_iter().collect();
//! let document = FormExpander::default().expand(&form, None).unwrap();
//!
//! let views = render_fields(&fields, SchemaVersion::V3, Some(&document));
//! assert_eq!(views[0].value, "Ada");
//! assert_eq!(views[1].label, "Age");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod document;
mod form;
mod path;
mod render;
mod schema;

// Re-exports
pub use document::{display_value, merge, nest, nest_path, Document};
pub use form::{flatten, ExpandError, FlatForm, FormExpander, ReservedKeys};
pub use path::{DottedPath, PathError, MAX_DEPTH};
pub use render::{initial_value, present, render_fields, resolve, FieldView};
pub use schema::{
    capitalize, parse_schema, title_case, SchemaError, SchemaField, SchemaRecord, SchemaVersion,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn edit_cycle_through_schema() {
        let fields = parse_schema(
            "title:text\nauthor.name:text:Author\nauthor.email:email",
            SchemaVersion::V3,
        )
        .unwrap();

        // New record starts from defaults
        let blank = render_fields(&fields, SchemaVersion::V3, None);
        assert!(blank.iter().all(|v| v.value.is_empty()));

        // Submit, then render again from the stored result
        let form: FlatForm = blank
            .iter()
            .map(|v| (v.name.clone(), format!("{} value", v.label)))
            .collect();
        let stored = FormExpander::default().expand(&form, None).unwrap();
        assert_eq!(
            serde_json::Value::Object(stored.clone()),
            json!({
                "title": "Title value",
                "author": {"name": "Author value", "email": "Author.Email value"}
            })
        );

        let views = render_fields(&fields, SchemaVersion::V3, Some(&stored));
        let values: Vec<_> = views.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(values, vec!["Title value", "Author value", "Author.Email value"]);
    }

    #[test]
    fn flatten_feeds_expand() {
        let document = match json!({"a": {"b": "1"}, "c": "2"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let form = flatten(&document).unwrap();
        let expanded = FormExpander::default().expand(&form, Some(&document)).unwrap();
        assert_eq!(expanded, document);
    }
}
