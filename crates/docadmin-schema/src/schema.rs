//! Collection schema grammar
//!
//! A schema is plain text, one field per line:
//!
//! ```text
//! name : control : label : type : default
//! ```
//!
//! Only `name` and `control` are required. Three grammar versions exist; see
//! [`SchemaVersion`].

use crate::document::Document;
use crate::path::{DottedPath, PathError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Schema grammar version
///
/// - `V1`: `name : control label words`; flat values, no defaults
/// - `V2`: full grammar; flat values, defaults for new records
/// - `V3`: full grammar; dotted names resolve into nested documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    V1,
    V2,
    #[default]
    V3,
}

impl SchemaVersion {
    /// Whether new records are pre-filled with declared defaults
    #[inline]
    #[must_use]
    pub fn uses_defaults(self) -> bool {
        !matches!(self, Self::V1)
    }

    /// Whether dotted names are looked up as nested paths
    #[inline]
    #[must_use]
    pub fn resolves_nested(self) -> bool {
        matches!(self, Self::V3)
    }

    fn parse_line(self, line_no: usize, line: &str) -> Result<SchemaField, SchemaError> {
        let malformed = || SchemaError::Malformed {
            line: line_no,
            content: line.to_string(),
        };

        let parts: Vec<&str> = line.split(':').map(str::trim).collect();
        if parts.len() < 2 {
            return Err(malformed());
        }

        let name: DottedPath = parts[0]
            .parse()
            .map_err(|source| SchemaError::InvalidFieldName {
                line: line_no,
                source,
            })?;
        let optional = |idx: usize| {
            parts
                .get(idx)
                .filter(|part| !part.is_empty())
                .map(|part| (*part).to_string())
        };

        match self {
            Self::V1 => {
                let mut words = parts[1].split_whitespace();
                let control = words.next().ok_or_else(malformed)?.to_string();
                let label_words: Vec<&str> = words.collect();
                let label = if label_words.is_empty() {
                    title_case(&name.to_string())
                } else {
                    label_words.join(" ")
                };
                Ok(SchemaField {
                    field_type: Some(control.clone()),
                    name,
                    control,
                    label,
                    default: None,
                })
            }
            Self::V2 | Self::V3 => {
                if parts[1].is_empty() {
                    return Err(malformed());
                }
                let label = optional(2).unwrap_or_else(|| title_case(&name.to_string()));
                Ok(SchemaField {
                    control: parts[1].to_string(),
                    label,
                    field_type: optional(3),
                    default: optional(4),
                    name,
                })
            }
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        };
        f.write_str(tag)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            "v3" | "3" => Ok(Self::V3),
            other => Err(SchemaError::UnknownVersion(other.to_string())),
        }
    }
}

/// One field declared by a schema line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    /// Dotted field name
    pub name: DottedPath,
    /// Render-widget hint, e.g. `text` or `textarea`
    pub control: String,
    /// Display name
    pub label: String,
    /// Optional type annotation
    pub field_type: Option<String>,
    /// Value used for new records
    pub default: Option<String>,
}

/// Parse schema text into ordered field declarations
///
/// Lines that are blank after trimming are skipped. The whole schema is
/// rejected on the first bad line.
///
/// # Errors
/// - [`SchemaError::Malformed`] if a line lacks a name or control
/// - [`SchemaError::InvalidFieldName`] if a name is not a valid dotted path
pub fn parse_schema(text: &str, version: SchemaVersion) -> Result<Vec<SchemaField>, SchemaError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| version.parse_line(idx + 1, line.trim()))
        .collect()
}

/// Schema attached to a collection
///
/// Persisted in the meta collection, one record per collection name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Collection name
    pub name: String,
    /// Raw schema text
    pub schema: String,
    /// Grammar version; absent means the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaVersion>,
}

impl SchemaRecord {
    /// Create record with no explicit version
    #[must_use]
    pub fn new(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            version: None,
        }
    }

    /// Set explicit grammar version
    #[must_use]
    pub fn with_version(mut self, version: SchemaVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Effective version given the configured fallback
    #[inline]
    #[must_use]
    pub fn version_or(&self, fallback: SchemaVersion) -> SchemaVersion {
        self.version.unwrap_or(fallback)
    }

    /// Parse this record's schema text
    ///
    /// # Errors
    /// See [`parse_schema`].
    pub fn fields(&self, fallback: SchemaVersion) -> Result<Vec<SchemaField>, SchemaError> {
        parse_schema(&self.schema, self.version_or(fallback))
    }

    /// Decode from a stored document
    ///
    /// # Errors
    /// Returns the serde error if required keys are missing or mistyped.
    pub fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(document))
    }

    /// Encode as a document for storage
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("name".to_string(), self.name.clone().into());
        document.insert("schema".to_string(), self.schema.clone().into());
        if let Some(version) = self.version {
            document.insert("version".to_string(), version.to_string().into());
        }
        document
    }
}

/// Errors while parsing schema text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Line has fewer than two colon-separated parts or no control
    #[error("malformed schema line {line}: '{content}' (expected name:control[:label[:type[:default]]])")]
    Malformed { line: usize, content: String },

    /// Field name is not a valid dotted path
    #[error("schema line {line}: {source}")]
    InvalidFieldName {
        line: usize,
        #[source]
        source: PathError,
    },

    /// Unrecognized version tag
    #[error("unknown schema version: '{0}'")]
    UnknownVersion(String),
}

/// Title-case a field name: each run of letters starts upper-case
///
/// `profile.first_name` → `Profile.First_Name`
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Capitalize a key: first character upper-case, the rest lower-case
#[must_use]
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str, control: &str, label: &str) -> SchemaField {
        SchemaField {
            name: name.parse().unwrap(),
            control: control.to_string(),
            label: label.to_string(),
            field_type: None,
            default: None,
        }
    }

    #[test]
    fn parse_line_with_label() {
        let fields = parse_schema("profile.name:text:Full Name", SchemaVersion::V3).unwrap();
        assert_eq!(fields, vec![field("profile.name", "text", "Full Name")]);
    }

    #[test]
    fn parse_line_defaults_label() {
        let fields = parse_schema("age:number", SchemaVersion::V3).unwrap();
        assert_eq!(fields, vec![field("age", "number", "Age")]);
    }

    #[test]
    fn parse_full_line_with_whitespace() {
        let fields = parse_schema(" color : select : Colour : string : red ", SchemaVersion::V3).unwrap();
        assert_eq!(
            fields,
            vec![SchemaField {
                field_type: Some("string".to_string()),
                default: Some("red".to_string()),
                ..field("color", "select", "Colour")
            }]
        );
    }

    #[test]
    fn parse_empty_label_falls_back_to_title() {
        let fields = parse_schema("first_name:text::string", SchemaVersion::V2).unwrap();
        assert_eq!(fields[0].label, "First_Name");
        assert_eq!(fields[0].field_type.as_deref(), Some("string"));
    }

    #[test]
    fn parse_preserves_order_and_skips_blank_lines() {
        let text = "title:text\n\n   \r\nbody:textarea:Body Text\r\nprofile.age:number\n";
        let fields = parse_schema(text, SchemaVersion::V3).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(names, vec!["title", "body", "profile.age"]);
        assert_eq!(fields[2].label, "Profile.Age");
    }

    #[test]
    fn parse_rejects_single_part_line() {
        let err = parse_schema("title:text\nbroken\n", SchemaVersion::V3).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Malformed {
                line: 2,
                content: "broken".to_string(),
            }
        );
    }

    #[test]
    fn parse_rejects_empty_control() {
        let err = parse_schema("title:", SchemaVersion::V3).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { line: 1, .. }));
    }

    #[test]
    fn parse_rejects_deep_names() {
        let err = parse_schema("a.b.c.d:text", SchemaVersion::V3).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidFieldName {
                line: 1,
                source: PathError::DepthExceeded { .. },
            }
        ));
    }

    #[test]
    fn parse_v1_grammar() {
        let fields = parse_schema("email: text Contact Email\nnotes: textarea", SchemaVersion::V1).unwrap();
        assert_eq!(
            fields,
            vec![
                SchemaField {
                    field_type: Some("text".to_string()),
                    ..field("email", "text", "Contact Email")
                },
                SchemaField {
                    field_type: Some("textarea".to_string()),
                    ..field("notes", "textarea", "Notes")
                },
            ]
        );
    }

    #[test]
    fn parse_v1_ignores_defaults() {
        let fields = parse_schema("color: text Colour:string:red", SchemaVersion::V1).unwrap();
        assert_eq!(fields[0].default, None);
    }

    #[test]
    fn version_from_str() {
        assert_eq!("v1".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1);
        assert_eq!("2".parse::<SchemaVersion>().unwrap(), SchemaVersion::V2);
        assert_eq!("V3".parse::<SchemaVersion>().unwrap(), SchemaVersion::V3);
        assert!(matches!(
            "v9".parse::<SchemaVersion>(),
            Err(SchemaError::UnknownVersion(_))
        ));
    }

    #[test]
    fn version_capabilities() {
        assert!(!SchemaVersion::V1.uses_defaults());
        assert!(SchemaVersion::V2.uses_defaults());
        assert!(!SchemaVersion::V2.resolves_nested());
        assert!(SchemaVersion::V3.resolves_nested());
        assert_eq!(SchemaVersion::default(), SchemaVersion::V3);
    }

    #[test]
    fn record_document_roundtrip() {
        let record = SchemaRecord::new("people", "name:text").with_version(SchemaVersion::V2);
        let decoded = SchemaRecord::from_document(record.to_document()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn record_without_version_uses_fallback() {
        let mut document = Document::new();
        document.insert("name".to_string(), "people".into());
        document.insert("schema".to_string(), "name:text".into());

        let record = SchemaRecord::from_document(document).unwrap();
        assert_eq!(record.version, None);
        assert_eq!(record.version_or(SchemaVersion::V2), SchemaVersion::V2);
    }

    #[test]
    fn title_case_rules() {
        assert_eq!(title_case("age"), "Age");
        assert_eq!(title_case("profile.name"), "Profile.Name");
        assert_eq!(title_case("mIxEd"), "Mixed");
        assert_eq!(title_case("2fa_code"), "2Fa_Code");
    }

    #[test]
    fn capitalize_rules() {
        assert_eq!(capitalize("title"), "Title");
        assert_eq!(capitalize("hELLO"), "Hello");
        assert_eq!(capitalize("_id"), "_id");
        assert_eq!(capitalize(""), "");
    }
}
