//! Error types for the admin panel
//!
//! Provides error handling for:
//! - Rejected input (malformed schema, too-deep field names, bad JSON, bad ids)
//! - Missing records
//! - Storage collaborator failures
//! - Configuration loading

use crate::store::StoreError;
use docadmin_schema::{ExpandError, SchemaError};
use std::path::PathBuf;

/// Main admin error type
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Identity collaborator reported no authenticated user
    #[error("authentication required")]
    Unauthorized,

    /// Schema text could not be parsed
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// Stored schema record has the wrong shape
    #[error("invalid schema record for collection '{collection}': {source}")]
    InvalidSchemaRecord {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Form submission could not be expanded
    #[error("invalid submission: {0}")]
    Expand(#[from] ExpandError),

    /// Raw JSON edit was not a JSON object
    #[error("invalid JSON document: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Record id is not well formed
    #[error("invalid record id: '{0}'")]
    InvalidRecordId(String),

    /// Collection name is empty
    #[error("invalid collection name: '{0}'")]
    InvalidCollectionName(String),

    /// Record id does not resolve to a document
    #[error("record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    /// Storage collaborator failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AdminError {
    /// Create not-found error
    pub fn not_found(collection: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Check if the error is a validation failure of user input
    ///
    /// These are reported as rejected input rather than operation failures.
    #[inline]
    #[must_use]
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            Self::Schema(_)
                | Self::Expand(_)
                | Self::InvalidJson(_)
                | Self::InvalidRecordId(_)
                | Self::InvalidCollectionName(_)
        )
    }

    /// Check if the error came from the storage side
    #[inline]
    #[must_use]
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::InvalidSchemaRecord { .. })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for admin operations
pub type AdminResult<T> = Result<T, AdminError>;
