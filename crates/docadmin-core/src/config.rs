//! Admin panel configuration

use crate::error::ConfigError;
use docadmin_schema::{ReservedKeys, SchemaVersion};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Panel configuration
///
/// Loadable from TOML; every key is optional.
///
/// ```toml
/// require_authentication = true
/// meta_collection = "_meta"
/// default_schema_version = "v3"
///
/// [reserved_keys]
/// id_key = "_id"
/// token_key = "csrf_token"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Gate every operation on the identity collaborator
    pub require_authentication: bool,
    /// Collection holding per-collection schema records
    pub meta_collection: String,
    /// Form keys never persisted as fields
    pub reserved_keys: ReservedKeys,
    /// Grammar used for schema records that do not state a version
    pub default_schema_version: SchemaVersion,
}

impl AdminConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With authentication requirement
    #[inline]
    #[must_use]
    pub fn with_authentication(mut self, required: bool) -> Self {
        self.require_authentication = required;
        self
    }

    /// With meta collection name
    #[inline]
    #[must_use]
    pub fn with_meta_collection(mut self, name: impl Into<String>) -> Self {
        self.meta_collection = name.into();
        self
    }

    /// With reserved form keys
    #[inline]
    #[must_use]
    pub fn with_reserved_keys(mut self, keys: ReservedKeys) -> Self {
        self.reserved_keys = keys;
        self
    }

    /// With default schema version
    #[inline]
    #[must_use]
    pub fn with_default_schema_version(mut self, version: SchemaVersion) -> Self {
        self.default_schema_version = version;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on invalid TOML or unknown values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            require_authentication: true,
            meta_collection: "_meta".to_string(),
            reserved_keys: ReservedKeys::default(),
            default_schema_version: SchemaVersion::V3,
        }
    }
}
